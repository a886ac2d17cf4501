use crate::domain::media::{MediaCategory, MediaFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFileDto {
    pub id: Uuid,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub url: String,
    pub category: MediaCategory,
    pub article_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<MediaFile> for MediaFileDto {
    fn from(file: MediaFile) -> Self {
        Self {
            id: file.id.into(),
            original_name: file.original_name,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            url: file.url,
            category: file.category,
            article_id: file.article_id.map(Into::into),
            project_id: file.project_id.map(Into::into),
            uploaded_by: file.uploaded_by.map(Into::into),
            uploaded_at: file.uploaded_at,
        }
    }
}
