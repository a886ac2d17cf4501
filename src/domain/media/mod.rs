use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::{ArticleId, ProjectId, UserId};
use crate::domain::persistence::entity::unexpected_record;
use crate::domain::persistence::{Column, Entity, EntityKind, FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub use crate::domain::ids::MediaFileId;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl MediaCategory {
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        match content_type.split('/').next().unwrap_or_default() {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "text" => Self::Document,
            "application"
                if content_type.contains("pdf")
                    || content_type.contains("msword")
                    || content_type.contains("officedocument") =>
            {
                Self::Document
            }
            _ => Self::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "document" => Ok(Self::Document),
            "other" => Ok(Self::Other),
            other => Err(DomainError::validation(format!(
                "unknown media category `{other}`"
            ))),
        }
    }
}

impl From<MediaCategory> for FieldValue {
    fn from(value: MediaCategory) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

/// Metadata for bytes held by the external storage collaborator. A file with
/// neither owner is an orphan and stays valid.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub id: MediaFileId,
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub url: String,
    pub category: MediaCategory,
    pub article_id: Option<ArticleId>,
    pub project_id: Option<ProjectId>,
    pub uploaded_by: Option<UserId>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMediaFile {
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub url: String,
    pub article_id: Option<ArticleId>,
    pub project_id: Option<ProjectId>,
    pub uploaded_by: Option<UserId>,
}

impl MediaFile {
    pub fn register(new: NewMediaFile, now: DateTime<Utc>) -> DomainResult<Self> {
        for (label, value) in [
            ("stored name", &new.stored_name),
            ("original name", &new.original_name),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{label} cannot be empty")));
            }
            if value.chars().count() > MAX_NAME_LEN {
                return Err(DomainError::validation(format!(
                    "{label} cannot exceed {MAX_NAME_LEN} characters"
                )));
            }
        }
        if new.size_bytes < 0 {
            return Err(DomainError::validation("size cannot be negative"));
        }
        if new.url.trim().is_empty() {
            return Err(DomainError::validation("storage url cannot be empty"));
        }

        Ok(Self {
            id: MediaFileId::new(),
            category: MediaCategory::from_content_type(&new.content_type),
            stored_name: new.stored_name,
            original_name: new.original_name,
            content_type: new.content_type,
            size_bytes: new.size_bytes,
            url: new.url,
            article_id: new.article_id,
            project_id: new.project_id,
            uploaded_by: new.uploaded_by,
            uploaded_at: now,
        })
    }

    pub const fn is_orphaned(&self) -> bool {
        self.article_id.is_none() && self.project_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFileColumn {
    Id,
    StoredName,
    OriginalName,
    ContentType,
    SizeBytes,
    Url,
    Category,
    ArticleId,
    ProjectId,
    UploadedBy,
    UploadedAt,
}

impl Column for MediaFileColumn {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::StoredName,
        Self::OriginalName,
        Self::ContentType,
        Self::SizeBytes,
        Self::Url,
        Self::Category,
        Self::ArticleId,
        Self::ProjectId,
        Self::UploadedBy,
        Self::UploadedAt,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::StoredName => "stored_name",
            Self::OriginalName => "original_name",
            Self::ContentType => "content_type",
            Self::SizeBytes => "size_bytes",
            Self::Url => "url",
            Self::Category => "category",
            Self::ArticleId => "article_id",
            Self::ProjectId => "project_id",
            Self::UploadedBy => "uploaded_by",
            Self::UploadedAt => "uploaded_at",
        }
    }
}

impl Entity for MediaFile {
    type Id = MediaFileId;
    type Column = MediaFileColumn;

    const KIND: EntityKind = EntityKind::MediaFile;

    fn id(&self) -> MediaFileId {
        self.id
    }

    fn field(&self, column: MediaFileColumn) -> FieldValue {
        match column {
            MediaFileColumn::Id => self.id.into(),
            MediaFileColumn::StoredName => self.stored_name.as_str().into(),
            MediaFileColumn::OriginalName => self.original_name.as_str().into(),
            MediaFileColumn::ContentType => self.content_type.as_str().into(),
            MediaFileColumn::SizeBytes => self.size_bytes.into(),
            MediaFileColumn::Url => self.url.as_str().into(),
            MediaFileColumn::Category => self.category.into(),
            MediaFileColumn::ArticleId => self.article_id.into(),
            MediaFileColumn::ProjectId => self.project_id.into(),
            MediaFileColumn::UploadedBy => self.uploaded_by.into(),
            MediaFileColumn::UploadedAt => self.uploaded_at.into(),
        }
    }

    fn into_record(self) -> Record {
        Record::MediaFile(self)
    }

    fn from_record(record: Record) -> DomainResult<Self> {
        match record {
            Record::MediaFile(file) => Ok(file),
            other => Err(unexpected_record(EntityKind::MediaFile, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_follows_content_type() {
        assert_eq!(MediaCategory::from_content_type("image/png"), MediaCategory::Image);
        assert_eq!(
            MediaCategory::from_content_type("application/pdf"),
            MediaCategory::Document
        );
        assert_eq!(
            MediaCategory::from_content_type("application/zip"),
            MediaCategory::Other
        );
    }

    #[test]
    fn unowned_files_are_orphans() {
        let file = MediaFile::register(
            NewMediaFile {
                stored_name: "a1b2.png".into(),
                original_name: "diagram.png".into(),
                content_type: "image/png".into(),
                size_bytes: 2048,
                url: "https://cdn.example.com/a1b2.png".into(),
                article_id: None,
                project_id: None,
                uploaded_by: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert!(file.is_orphaned());
        assert_eq!(file.category, MediaCategory::Image);
    }
}
