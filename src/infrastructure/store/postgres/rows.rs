use super::map_sqlx;
use crate::domain::article::{
    Article, ArticleContent, ArticleParts, ArticleSlug, ArticleStatus, ArticleSummary, ArticleTitle,
    SeoMetadata,
};
use crate::domain::comment::{AuthorEmail, AuthorName, Comment, CommentBody, CommentParts, CommentStatus};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::{ArticleId, CommentId, ConcurrencyToken, MediaFileId, ProjectId, TagId, UserId};
use crate::domain::media::{MediaCategory, MediaFile};
use crate::domain::persistence::{EntityKind, Record};
use crate::domain::project::{Project, ProjectDetails};
use crate::domain::tag::{Tag, TagName, TagSlug};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, postgres::PgRow};
use std::collections::HashMap;
use uuid::Uuid;

/// Columns selected for each kind, in the order the decoders read them.
pub(super) const fn select_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Article => &[
            "id",
            "title",
            "slug",
            "summary",
            "content",
            "status",
            "created_at",
            "updated_at",
            "published_at",
            "meta_title",
            "meta_description",
            "meta_keywords",
            "author_id",
            "version",
        ],
        EntityKind::Comment => &[
            "id",
            "article_id",
            "author_name",
            "author_email",
            "content",
            "status",
            "submitted_at",
            "approved_at",
            "ip_address",
            "user_agent",
            "version",
        ],
        EntityKind::Tag => &["id", "name", "slug", "description", "created_at"],
        EntityKind::Project => &[
            "id",
            "title",
            "description",
            "tech_stack",
            "display_order",
            "is_active",
            "completed_on",
            "repository_url",
            "live_url",
            "created_at",
            "updated_at",
            "version",
        ],
        EntityKind::MediaFile => &[
            "id",
            "stored_name",
            "original_name",
            "content_type",
            "size_bytes",
            "url",
            "category",
            "article_id",
            "project_id",
            "uploaded_by",
            "uploaded_at",
        ],
    }
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> DomainResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column).map_err(map_sqlx)
}

fn corrupt(kind: EntityKind, err: &DomainError) -> DomainError {
    DomainError::persistence(format!("stored {kind} row is invalid: {err}"))
}

/// Ordered tag ids per article, read from the join table.
pub(super) type TagLinks = HashMap<Uuid, Vec<TagId>>;

pub(super) fn decode(kind: EntityKind, row: &PgRow, links: &TagLinks) -> DomainResult<Record> {
    let record = match kind {
        EntityKind::Article => article(row, links).map(Record::Article),
        EntityKind::Comment => comment(row).map(Record::Comment),
        EntityKind::Tag => tag(row).map(Record::Tag),
        EntityKind::Project => project(row).map(Record::Project),
        EntityKind::MediaFile => media_file(row).map(Record::MediaFile),
    };
    record.map_err(|err| match err {
        DomainError::Validation(_) => corrupt(kind, &err),
        other => other,
    })
}

fn article(row: &PgRow, links: &TagLinks) -> DomainResult<Article> {
    let id: Uuid = get(row, "id")?;
    let status: String = get(row, "status")?;
    Article::restore(ArticleParts {
        id: ArticleId::from(id),
        title: ArticleTitle::new(get::<String>(row, "title")?)?,
        slug: ArticleSlug::new(get::<String>(row, "slug")?)?,
        summary: ArticleSummary::parse(get(row, "summary")?)?,
        content: ArticleContent::new(get::<String>(row, "content")?)?,
        seo: SeoMetadata {
            meta_title: get(row, "meta_title")?,
            meta_description: get(row, "meta_description")?,
            meta_keywords: get(row, "meta_keywords")?,
        },
        author_id: get::<Option<Uuid>>(row, "author_id")?.map(UserId::from),
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
        status: status.parse::<ArticleStatus>()?,
        published_at: get::<Option<DateTime<Utc>>>(row, "published_at")?,
        tag_ids: links.get(&id).cloned().unwrap_or_default(),
        version: ConcurrencyToken::from_uuid(get(row, "version")?),
    })
}

fn comment(row: &PgRow) -> DomainResult<Comment> {
    let status: String = get(row, "status")?;
    Ok(Comment::restore(CommentParts {
        id: CommentId::from(get::<Uuid>(row, "id")?),
        article_id: ArticleId::from(get::<Uuid>(row, "article_id")?),
        author_name: AuthorName::new(get::<String>(row, "author_name")?)?,
        author_email: AuthorEmail::new(get::<String>(row, "author_email")?)?,
        content: CommentBody::new(get::<String>(row, "content")?)?,
        submitted_at: get(row, "submitted_at")?,
        ip_address: get(row, "ip_address")?,
        user_agent: get(row, "user_agent")?,
        status: status.parse::<CommentStatus>()?,
        approved_at: get(row, "approved_at")?,
        version: ConcurrencyToken::from_uuid(get(row, "version")?),
    }))
}

fn tag(row: &PgRow) -> DomainResult<Tag> {
    Ok(Tag {
        id: TagId::from(get::<Uuid>(row, "id")?),
        name: TagName::new(get::<String>(row, "name")?)?,
        slug: TagSlug::new(get::<String>(row, "slug")?)?,
        description: get(row, "description")?,
        created_at: get(row, "created_at")?,
    })
}

fn project(row: &PgRow) -> DomainResult<Project> {
    let details = ProjectDetails {
        title: get(row, "title")?,
        description: get(row, "description")?,
        tech_stack: get(row, "tech_stack")?,
        display_order: get(row, "display_order")?,
        is_active: get(row, "is_active")?,
        completed_on: get::<Option<NaiveDate>>(row, "completed_on")?,
        repository_url: get(row, "repository_url")?,
        live_url: get(row, "live_url")?,
    };
    Ok(Project::restore(
        ProjectId::from(get::<Uuid>(row, "id")?),
        details,
        get(row, "created_at")?,
        get(row, "updated_at")?,
        ConcurrencyToken::from_uuid(get(row, "version")?),
    ))
}

fn media_file(row: &PgRow) -> DomainResult<MediaFile> {
    let category: String = get(row, "category")?;
    Ok(MediaFile {
        id: MediaFileId::from(get::<Uuid>(row, "id")?),
        stored_name: get(row, "stored_name")?,
        original_name: get(row, "original_name")?,
        content_type: get(row, "content_type")?,
        size_bytes: get(row, "size_bytes")?,
        url: get(row, "url")?,
        category: category.parse::<MediaCategory>()?,
        article_id: get::<Option<Uuid>>(row, "article_id")?.map(ArticleId::from),
        project_id: get::<Option<Uuid>>(row, "project_id")?.map(ProjectId::from),
        uploaded_by: get::<Option<Uuid>>(row, "uploaded_by")?.map(UserId::from),
        uploaded_at: get(row, "uploaded_at")?,
    })
}
