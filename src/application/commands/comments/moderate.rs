use super::CommentCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::{Audience, CommentDto},
        error::{ApplicationError, ApplicationResult},
    },
    domain::{
        comment::{CommentId, ModerationAction},
        ids::ConcurrencyToken,
    },
};
use uuid::Uuid;

pub struct ModerateCommentCommand {
    pub id: Uuid,
    pub action: ModerationAction,
    pub version: Option<ConcurrencyToken>,
}

impl CommentCommandService {
    /// Any action is accepted from any status so moderators can correct
    /// earlier decisions. The parent article is never touched.
    pub async fn moderate_comment(
        &self,
        audience: Audience,
        command: ModerateCommentCommand,
    ) -> ApplicationResult<CommentDto> {
        ensure_staff(audience, "moderate comments")?;
        let id = CommentId::from(command.id);
        let uow = self.unit_of_work();

        let attempt = async {
            let comments = uow.comments();
            let mut comment = comments.get_by_id(id).await?;
            if let Some(version) = command.version {
                comment = comment.with_expected_version(version);
            }
            comment.moderate(command.action, self.clock.now());
            comments.update(comment.clone()).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(comment)
        }
        .await;

        let comment = attempt.map_err(|err| self.fail("moderate_comment", err))?;
        self.record(command.action.event_name(), &comment);

        let stored = uow.comments().get_by_id(id).await?;
        Ok(CommentDto::for_audience(stored, audience))
    }
}
