// src/application/commands/articles/publish.rs
use super::ArticleCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::{ArticleDto, Audience},
        error::{ApplicationError, ApplicationResult},
        queries::articles::article_dto,
    },
    domain::{article::ArticleId, ids::ConcurrencyToken},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleTransition {
    Publish,
    Unpublish,
    Archive,
}

pub struct ChangeArticleStatusCommand {
    pub id: Uuid,
    /// When set, the write fails if the article changed since this token.
    pub version: Option<ConcurrencyToken>,
    pub transition: ArticleTransition,
}

impl ArticleCommandService {
    pub async fn change_status(
        &self,
        audience: Audience,
        command: ChangeArticleStatusCommand,
    ) -> ApplicationResult<ArticleDto> {
        ensure_staff(audience, "change article status")?;

        let id = ArticleId::from(command.id);
        let now = self.clock.now();
        let uow = self.unit_of_work();

        let attempt = async {
            let articles = uow.articles();
            let mut article = articles.get_by_id(id).await?;
            if let Some(version) = command.version {
                article = article.with_expected_version(version);
            }

            let event = match command.transition {
                ArticleTransition::Publish => article.publish(now),
                ArticleTransition::Unpublish => article.unpublish(now)?,
                ArticleTransition::Archive => article.archive(now),
            };

            articles.update(article).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(event)
        }
        .await;

        let event = match attempt {
            Ok(event) => event,
            Err(err) => return Err(self.abandon(&uow, "change_article_status", err).await),
        };
        self.record(&[event]);

        let article = uow.articles().get_by_id(id).await?;
        Ok(article_dto(&uow, article).await?)
    }
}
