use crate::application::dto::Audience;
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::ids::ConcurrencyToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub article_id: Uuid,
    pub author_name: String,
    /// Only disclosed to staff.
    pub author_email: Option<String>,
    pub content: String,
    pub status: CommentStatus,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub version: ConcurrencyToken,
}

impl CommentDto {
    pub fn for_audience(comment: Comment, audience: Audience) -> Self {
        Self {
            id: comment.id.into(),
            article_id: comment.article_id.into(),
            status: comment.status(),
            approved_at: comment.approved_at(),
            version: comment.version(),
            author_name: comment.author_name.as_str().to_string(),
            author_email: audience
                .is_staff()
                .then(|| comment.author_email.as_str().to_string()),
            content: comment.content.as_str().to_string(),
            submitted_at: comment.submitted_at,
        }
    }
}
