// src/application/commands/articles/update.rs
use super::{ArticleCommandService, SeoInput};
use crate::{
    application::{
        commands::{ensure_staff, tags::resolve_tags},
        dto::{ArticleDto, Audience},
        error::{ApplicationError, ApplicationResult, FieldErrors},
        queries::articles::article_dto,
    },
    domain::{
        article::{ArticleContent, ArticleEvent, ArticleId, ArticleSlug, ArticleSummary, ArticleTitle},
        ids::ConcurrencyToken,
    },
};
use uuid::Uuid;

pub struct UpdateArticleCommand {
    pub id: Uuid,
    /// Token from the read the edit was based on.
    pub version: ConcurrencyToken,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    /// `None` leaves the tag list untouched.
    pub tags: Option<Vec<String>>,
    pub seo: SeoInput,
}

impl ArticleCommandService {
    pub async fn update_article(
        &self,
        audience: Audience,
        command: UpdateArticleCommand,
    ) -> ApplicationResult<ArticleDto> {
        ensure_staff(audience, "edit articles")?;
        let UpdateArticleCommand {
            id,
            version,
            title,
            content,
            summary,
            tags: tag_names,
            seo,
        } = command;

        let mut errors = FieldErrors::default();
        let title = errors.check("title", ArticleTitle::new(title));
        let content = errors.check("content", ArticleContent::new(content));
        let summary = errors.check("summary", ArticleSummary::parse(summary));
        let seo = errors.check("seo", seo.into_metadata());
        errors.into_result()?;
        let (Some(title), Some(content), Some(summary), Some(seo)) = (title, content, summary, seo)
        else {
            return Err(ApplicationError::validation("invalid article input"));
        };

        let id = ArticleId::from(id);
        let now = self.clock.now();
        let uow = self.unit_of_work();
        uow.begin_transaction().await?;

        let attempt = async {
            let articles = uow.articles();
            let mut article = articles
                .get_by_id(id)
                .await?
                .with_expected_version(version);

            if article.title != title {
                let slug = self
                    .slug_service
                    .generate_article_slug(&articles, title.as_str(), Some(id.into()), now)
                    .await?;
                article.set_slug(ArticleSlug::new(slug)?, now);
            }
            article.set_content(title, content, summary, now);
            article.set_seo(seo, now);

            if let Some(names) = &tag_names {
                let tags = resolve_tags(&uow, &self.slug_service, names, now).await?;
                article.set_tags(tags.iter().map(|tag| tag.id).collect(), now);
            }

            articles.update(article).await?;
            uow.commit_transaction().await?;
            Ok::<_, ApplicationError>(())
        }
        .await;

        if let Err(err) = attempt {
            return Err(self.abandon(&uow, "update_article", err).await);
        }
        self.record(&[ArticleEvent::Updated { id, at: now }]);

        let updated = uow.articles().get_by_id(id).await?;
        Ok(article_dto(&uow, updated).await?)
    }
}
