use crate::application::dto::TagDto;
use crate::domain::article::{Article, ArticleStatus, SeoMetadata};
use crate::domain::ids::ConcurrencyToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub seo: SeoMetadata,
    pub author_id: Option<Uuid>,
    pub tags: Vec<TagDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Echo back unchanged on the next update.
    pub version: ConcurrencyToken,
}

impl ArticleDto {
    /// `tags` must already be in the article's tag order.
    pub fn from_article(article: Article, tags: Vec<TagDto>) -> Self {
        Self {
            id: article.id.into(),
            status: article.status(),
            published_at: article.published_at(),
            version: article.version(),
            title: article.title.into(),
            slug: article.slug.into(),
            summary: article.summary.map(|s| s.as_str().to_string()),
            content: article.content.into(),
            seo: article.seo,
            author_id: article.author_id.map(Into::into),
            tags,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Listing order for article pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSort {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl ArticleSort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
        }
    }
}
