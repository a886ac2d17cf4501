use super::CommentCommandService;
use crate::{
    application::{
        dto::{Audience, CommentDto},
        error::{ApplicationError, ApplicationResult, FieldErrors},
    },
    domain::{
        article::ArticleId,
        comment::{AuthorEmail, AuthorName, Comment, CommentBody, NewComment},
    },
};
use uuid::Uuid;

pub struct SubmitCommentCommand {
    pub article_id: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl CommentCommandService {
    /// Anyone may comment on a published article. The comment waits in the
    /// moderation queue until staff approve it.
    pub async fn submit_comment(
        &self,
        command: SubmitCommentCommand,
    ) -> ApplicationResult<CommentDto> {
        let SubmitCommentCommand {
            article_id,
            author_name,
            author_email,
            content,
            ip_address,
            user_agent,
        } = command;

        let mut errors = FieldErrors::default();
        let author_name = errors.check("author_name", AuthorName::new(author_name));
        let author_email = errors.check("author_email", AuthorEmail::new(author_email));
        let content = errors.check("content", CommentBody::new(content));
        errors.into_result()?;
        let (Some(author_name), Some(author_email), Some(content)) =
            (author_name, author_email, content)
        else {
            return Err(ApplicationError::validation("invalid comment input"));
        };

        let article_id = ArticleId::from(article_id);
        let uow = self.unit_of_work();

        let attempt = async {
            let article = uow.articles().get_by_id(article_id).await?;
            if !article.is_published() {
                return Err(ApplicationError::validation(
                    "comments are only accepted on published articles",
                ));
            }

            let comment = Comment::submit(
                NewComment {
                    article_id,
                    author_name,
                    author_email,
                    content,
                    ip_address,
                    user_agent,
                },
                self.clock.now(),
            );
            let comment = uow.comments().add(comment).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(comment)
        }
        .await;

        let comment = attempt.map_err(|err| self.fail("submit_comment", err))?;
        self.record("CommentSubmitted", &comment);

        let stored = uow.comments().get_by_id(comment.id).await?;
        Ok(CommentDto::for_audience(stored, Audience::Public))
    }
}
