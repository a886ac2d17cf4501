use super::TagCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::Audience,
        error::{ApplicationError, ApplicationResult},
    },
    domain::tag::TagId,
};
use uuid::Uuid;

pub struct DeleteTagCommand {
    pub id: Uuid,
}

impl TagCommandService {
    /// Articles keep their other tags; only the links to this one go.
    pub async fn delete_tag(
        &self,
        audience: Audience,
        command: DeleteTagCommand,
    ) -> ApplicationResult<()> {
        ensure_staff(audience, "delete tags")?;
        let id = TagId::from(command.id);
        let uow = self.unit_of_work();

        let attempt = async {
            let tags = uow.tags();
            let tag = tags.get_by_id(id).await?;
            tags.delete_entity(&tag).await;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(tag)
        }
        .await;

        let tag = attempt.map_err(|err| self.fail("delete_tag", err))?;
        self.record("TagDeleted", tag.id, tag.slug.as_str());
        Ok(())
    }
}
