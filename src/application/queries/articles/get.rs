use super::{ArticleQueryService, article_dto};
use crate::{
    application::{
        dto::{ArticleDto, Audience},
        error::{ApplicationError, ApplicationResult},
    },
    domain::article::{Article, ArticleColumn, ArticleId},
    domain::persistence::Predicate,
};
use uuid::Uuid;

pub struct GetArticleByIdQuery {
    pub id: Uuid,
}

pub struct GetArticleBySlugQuery {
    pub slug: String,
}

/// Unpublished articles do not exist as far as the public is concerned.
fn visible_to(audience: Audience, article: Option<Article>) -> ApplicationResult<Article> {
    match article {
        Some(article) if audience.is_staff() || article.is_published() => Ok(article),
        _ => Err(ApplicationError::not_found("article not found")),
    }
}

impl ArticleQueryService {
    pub async fn get_article(
        &self,
        audience: Audience,
        query: GetArticleByIdQuery,
    ) -> ApplicationResult<ArticleDto> {
        let uow = self.unit_of_work();
        let article = uow.articles().find_by_id(ArticleId::from(query.id)).await?;
        let article = visible_to(audience, article)?;
        Ok(article_dto(&uow, article).await?)
    }

    pub async fn get_article_by_slug(
        &self,
        audience: Audience,
        query: GetArticleBySlugQuery,
    ) -> ApplicationResult<ArticleDto> {
        let uow = self.unit_of_work();
        let article = uow
            .articles()
            .get_all(Some(Predicate::eq_ignore_case(
                ArticleColumn::Slug,
                query.slug.trim(),
            )))
            .await?
            .into_iter()
            .next();
        let article = visible_to(audience, article)?;
        Ok(article_dto(&uow, article).await?)
    }
}
