// src/application/commands/articles/delete.rs
use super::ArticleCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::Audience,
        error::{ApplicationError, ApplicationResult},
    },
    domain::{
        article::{ArticleEvent, ArticleId},
        ids::ConcurrencyToken,
    },
};
use uuid::Uuid;

pub struct DeleteArticleCommand {
    pub id: Uuid,
    pub version: Option<ConcurrencyToken>,
}

impl ArticleCommandService {
    /// Comments and tag links go with the article; attached media is kept
    /// and becomes orphaned.
    pub async fn delete_article(
        &self,
        audience: Audience,
        command: DeleteArticleCommand,
    ) -> ApplicationResult<()> {
        ensure_staff(audience, "delete articles")?;

        let id = ArticleId::from(command.id);
        let uow = self.unit_of_work();

        let attempt = async {
            let articles = uow.articles();
            let mut article = articles.get_by_id(id).await?;
            if let Some(version) = command.version {
                article = article.with_expected_version(version);
            }
            articles.delete_entity(&article).await;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(())
        }
        .await;

        if let Err(err) = attempt {
            return Err(self.abandon(&uow, "delete_article", err).await);
        }
        self.record(&[ArticleEvent::Deleted {
            id,
            at: self.clock.now(),
        }]);
        Ok(())
    }
}
