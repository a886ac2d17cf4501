use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    application::{
        dto::{ArticleDto, TagDto},
        unit_of_work::UnitOfWork,
    },
    domain::{
        article::Article,
        errors::DomainResult,
        persistence::{Predicate, Store},
        tag::{TagColumn, TagId},
    },
};

pub struct ArticleQueryService {
    pub(super) store: Arc<dyn Store>,
}

impl ArticleQueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub(super) fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }
}

async fn tags_by_id(uow: &UnitOfWork, ids: &[TagId]) -> DomainResult<HashMap<TagId, TagDto>> {
    let mut filter: Option<Predicate<TagColumn>> = None;
    for id in ids {
        let clause = Predicate::eq(TagColumn::Id, *id);
        filter = Some(match filter {
            Some(existing) => existing.or(clause),
            None => clause,
        });
    }
    let Some(filter) = filter else {
        return Ok(HashMap::new());
    };

    Ok(uow
        .tags()
        .get_all(Some(filter))
        .await?
        .into_iter()
        .map(|tag| (tag.id, TagDto::from(tag)))
        .collect())
}

pub(crate) async fn article_dto(uow: &UnitOfWork, article: Article) -> DomainResult<ArticleDto> {
    let mut dtos = article_dtos(uow, vec![article]).await?;
    Ok(dtos.remove(0))
}

/// Attach tag details in each article's own tag order, with one tag query
/// for the whole batch.
pub(crate) async fn article_dtos(
    uow: &UnitOfWork,
    articles: Vec<Article>,
) -> DomainResult<Vec<ArticleDto>> {
    let mut wanted: Vec<TagId> = Vec::new();
    for article in &articles {
        for id in article.tag_ids() {
            if !wanted.contains(id) {
                wanted.push(*id);
            }
        }
    }
    let tags = tags_by_id(uow, &wanted).await?;

    Ok(articles
        .into_iter()
        .map(|article| {
            let article_tags = article
                .tag_ids()
                .iter()
                .filter_map(|id| tags.get(id).cloned())
                .collect();
            ArticleDto::from_article(article, article_tags)
        })
        .collect())
}
