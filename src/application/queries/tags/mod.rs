use std::sync::Arc;

use crate::{
    application::{
        dto::{Audience, TagDto, TagWithCountDto},
        error::{ApplicationError, ApplicationResult},
        unit_of_work::UnitOfWork,
    },
    domain::{
        article::{ArticleColumn, ArticleStatus},
        persistence::{Predicate, Store},
        tag::TagColumn,
    },
};

pub struct TagQueryService {
    store: Arc<dyn Store>,
}

impl TagQueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    /// Every tag by name with the number of articles carrying it. Public
    /// counts only include published articles.
    pub async fn list_tags(&self, audience: Audience) -> ApplicationResult<Vec<TagWithCountDto>> {
        let uow = self.unit_of_work();
        let tags = uow
            .tags()
            .get_all_sorted(None, TagColumn::Name, true)
            .await?;
        let articles = uow.articles();

        let mut listed = Vec::with_capacity(tags.len());
        for tag in tags {
            let mut filter = Predicate::has_member(ArticleColumn::Tags, tag.id);
            if !audience.is_staff() {
                filter = filter.and(Predicate::eq(
                    ArticleColumn::Status,
                    ArticleStatus::Published,
                ));
            }
            let article_count = articles.count(Some(filter)).await?;
            listed.push(TagWithCountDto {
                tag: tag.into(),
                article_count,
            });
        }
        Ok(listed)
    }

    pub async fn get_tag_by_slug(&self, slug: &str) -> ApplicationResult<TagDto> {
        let uow = self.unit_of_work();
        uow.tags()
            .get_all(Some(Predicate::eq_ignore_case(TagColumn::Slug, slug.trim())))
            .await?
            .into_iter()
            .next()
            .map(TagDto::from)
            .ok_or_else(|| ApplicationError::not_found(format!("tag `{slug}` not found")))
    }
}
