mod get;
mod list;
mod service;

pub use get::{GetArticleByIdQuery, GetArticleBySlugQuery};
pub use list::ListArticlesQuery;
pub(crate) use service::{article_dto, article_dtos};
pub use service::ArticleQueryService;
