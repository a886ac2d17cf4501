use super::TagCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::{Audience, TagDto},
        error::{ApplicationError, ApplicationResult},
    },
    domain::tag::{Tag, TagName, TagSlug},
};

pub struct CreateTagCommand {
    pub name: String,
    pub description: Option<String>,
}

impl TagCommandService {
    /// The slug is derived from `name`; a taken slug gets a `-1`, `-2`, ...
    /// suffix.
    pub async fn create_tag(
        &self,
        audience: Audience,
        command: CreateTagCommand,
    ) -> ApplicationResult<TagDto> {
        ensure_staff(audience, "create tags")?;
        let CreateTagCommand { name, description } = command;
        let name = TagName::new(name)?;
        let uow = self.unit_of_work();

        let attempt = async {
            let tags = uow.tags();
            let slug = self
                .slug_service
                .generate_unique_slug(&tags, name.as_str(), None)
                .await?;
            let tag = Tag::new(
                name,
                TagSlug::new(slug)?,
                description,
                self.clock.now(),
            )?;
            let tag = tags.add(tag).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(tag)
        }
        .await;

        let tag = attempt.map_err(|err| self.fail("create_tag", err))?;
        self.record("TagCreated", tag.id, tag.slug.as_str());
        Ok(tag.into())
    }
}
