use super::CommentCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::Audience,
        error::{ApplicationError, ApplicationResult},
    },
    domain::comment::CommentId,
};
use uuid::Uuid;

pub struct DeleteCommentCommand {
    pub id: Uuid,
}

impl CommentCommandService {
    pub async fn delete_comment(
        &self,
        audience: Audience,
        command: DeleteCommentCommand,
    ) -> ApplicationResult<()> {
        ensure_staff(audience, "delete comments")?;
        let uow = self.unit_of_work();

        let attempt = async {
            let comments = uow.comments();
            let comment = comments.get_by_id(CommentId::from(command.id)).await?;
            comments.delete_entity(&comment).await;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(comment)
        }
        .await;

        let comment = attempt.map_err(|err| self.fail("delete_comment", err))?;
        self.record("CommentDeleted", &comment);
        Ok(())
    }
}
