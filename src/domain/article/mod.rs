pub mod entity;
pub mod events;
pub mod status;
pub mod value_objects;

pub use crate::domain::ids::ArticleId;
pub use entity::{Article, ArticleColumn, ArticleParts, NewArticle};
pub use events::ArticleEvent;
pub use status::ArticleStatus;
pub use value_objects::{
    ArticleContent, ArticleSlug, ArticleSummary, ArticleTitle, SeoMetadata,
};
