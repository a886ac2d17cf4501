use super::{ArticleQueryService, article_dtos};
use crate::{
    application::{
        dto::{ArticleDto, ArticleSort, Audience, Page},
        error::ApplicationResult,
    },
    domain::{
        article::{ArticleColumn, ArticleStatus},
        persistence::{PageRequest, Predicate},
        tag::TagColumn,
    },
};

const MAX_PAGE_SIZE: u32 = 100;

/// Every field takes part in the read-through cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListArticlesQuery {
    pub page: u32,
    pub page_size: u32,
    /// Case-insensitive match against title, summary and content.
    pub search: Option<String>,
    /// Tag slug.
    pub tag: Option<String>,
    pub sort: ArticleSort,
}

impl Default for ListArticlesQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            search: None,
            tag: None,
            sort: ArticleSort::default(),
        }
    }
}

fn conjoin(
    filter: Option<Predicate<ArticleColumn>>,
    clause: Predicate<ArticleColumn>,
) -> Option<Predicate<ArticleColumn>> {
    Some(match filter {
        Some(existing) => existing.and(clause),
        None => clause,
    })
}

impl ArticleQueryService {
    pub async fn list_articles(
        &self,
        audience: Audience,
        query: ListArticlesQuery,
    ) -> ApplicationResult<Page<ArticleDto>> {
        let page_size = query.page_size.min(MAX_PAGE_SIZE);
        let uow = self.unit_of_work();
        let articles = uow.articles();

        let mut filter = None;
        if !audience.is_staff() {
            filter = conjoin(
                filter,
                Predicate::eq(ArticleColumn::Status, ArticleStatus::Published),
            );
        }
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            filter = conjoin(
                filter,
                Predicate::contains_text(ArticleColumn::Title, term)
                    .or(Predicate::contains_text(ArticleColumn::Summary, term))
                    .or(Predicate::contains_text(ArticleColumn::Content, term)),
            );
        }
        if let Some(slug) = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let tag = uow
                .tags()
                .get_all(Some(Predicate::eq_ignore_case(TagColumn::Slug, slug)))
                .await?
                .into_iter()
                .next();
            let Some(tag) = tag else {
                return Ok(Page::new(Vec::new(), query.page, page_size, 0));
            };
            filter = conjoin(filter, Predicate::has_member(ArticleColumn::Tags, tag.id));
        }

        // drafts have no publication date, so staff listings sort by creation
        let date_column = if audience.is_staff() {
            ArticleColumn::CreatedAt
        } else {
            ArticleColumn::PublishedAt
        };
        let (column, ascending) = match query.sort {
            ArticleSort::Newest => (date_column, false),
            ArticleSort::Oldest => (date_column, true),
            ArticleSort::Title => (ArticleColumn::Title, true),
        };

        let mut request = PageRequest::new(query.page, page_size).order_by(column, ascending);
        if let Some(filter) = filter.clone() {
            request = request.with_filter(filter);
        }
        request.validate()?;

        let total = articles.count(filter).await?;
        let items = articles.get_paged(request).await?;
        let items = article_dtos(&uow, items).await?;
        Ok(Page::new(items, query.page, page_size, total))
    }
}
