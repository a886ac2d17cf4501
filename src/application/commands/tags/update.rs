use super::TagCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::{Audience, TagDto},
        error::{ApplicationError, ApplicationResult},
    },
    domain::tag::{TagId, TagName, TagSlug},
};
use uuid::Uuid;

pub struct UpdateTagCommand {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl TagCommandService {
    /// Renaming regenerates the slug, ignoring the tag's own current slug.
    pub async fn update_tag(
        &self,
        audience: Audience,
        command: UpdateTagCommand,
    ) -> ApplicationResult<TagDto> {
        ensure_staff(audience, "edit tags")?;
        let UpdateTagCommand { id, name, description } = command;
        let name = TagName::new(name)?;
        let id = TagId::from(id);
        let uow = self.unit_of_work();

        let attempt = async {
            let tags = uow.tags();
            let mut tag = tags.get_by_id(id).await?;
            if tag.name != name {
                let slug = self
                    .slug_service
                    .generate_unique_slug(&tags, name.as_str(), Some(id.into()))
                    .await?;
                tag.rename(name, TagSlug::new(slug)?);
            }
            tag.set_description(description)?;
            tags.update(tag.clone()).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(tag)
        }
        .await;

        let tag = attempt.map_err(|err| self.fail("update_tag", err))?;
        self.record("TagUpdated", tag.id, tag.slug.as_str());
        Ok(tag.into())
    }
}
