use crate::domain::ids::ArticleId;
use chrono::{DateTime, Utc};

/// Outcome of an article lifecycle transition, reported to telemetry once
/// the change is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleEvent {
    Created {
        id: ArticleId,
        at: DateTime<Utc>,
    },
    Updated {
        id: ArticleId,
        at: DateTime<Utc>,
    },
    Published {
        id: ArticleId,
        at: DateTime<Utc>,
        republished: bool,
    },
    Unpublished {
        id: ArticleId,
        at: DateTime<Utc>,
    },
    Archived {
        id: ArticleId,
        at: DateTime<Utc>,
    },
    Deleted {
        id: ArticleId,
        at: DateTime<Utc>,
    },
}

impl ArticleEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "ArticleCreated",
            Self::Updated { .. } => "ArticleUpdated",
            Self::Published { .. } => "ArticlePublished",
            Self::Unpublished { .. } => "ArticleUnpublished",
            Self::Archived { .. } => "ArticleArchived",
            Self::Deleted { .. } => "ArticleDeleted",
        }
    }

    pub const fn article_id(&self) -> ArticleId {
        match self {
            Self::Created { id, .. }
            | Self::Updated { id, .. }
            | Self::Published { id, .. }
            | Self::Unpublished { id, .. }
            | Self::Archived { id, .. }
            | Self::Deleted { id, .. } => *id,
        }
    }
}
