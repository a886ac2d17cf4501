// src/domain/article/entity.rs
use super::events::ArticleEvent;
use super::status::ArticleStatus;
use super::value_objects::{ArticleContent, ArticleSlug, ArticleSummary, ArticleTitle, SeoMetadata};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::{ArticleId, ConcurrencyToken, TagId, UserId};
use crate::domain::persistence::entity::unexpected_record;
use crate::domain::persistence::{Column, Entity, EntityKind, FieldValue, Record};
use chrono::{DateTime, Utc};

/// An article and its publication lifecycle.
///
/// `status` and `published_at` only change through [`Article::publish`],
/// [`Article::unpublish`] and [`Article::archive`].
#[derive(Debug, Clone)]
pub struct Article {
    pub id: ArticleId,
    pub title: ArticleTitle,
    pub slug: ArticleSlug,
    pub summary: Option<ArticleSummary>,
    pub content: ArticleContent,
    pub seo: SeoMetadata,
    pub author_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    status: ArticleStatus,
    published_at: Option<DateTime<Utc>>,
    tag_ids: Vec<TagId>,
    version: ConcurrencyToken,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: ArticleTitle,
    pub slug: ArticleSlug,
    pub summary: Option<ArticleSummary>,
    pub content: ArticleContent,
    pub seo: SeoMetadata,
    pub author_id: Option<UserId>,
    pub tag_ids: Vec<TagId>,
    pub created_at: DateTime<Utc>,
}

/// Full persisted state, used by stores to rebuild an [`Article`].
#[derive(Debug, Clone)]
pub struct ArticleParts {
    pub id: ArticleId,
    pub title: ArticleTitle,
    pub slug: ArticleSlug,
    pub summary: Option<ArticleSummary>,
    pub content: ArticleContent,
    pub seo: SeoMetadata,
    pub author_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub tag_ids: Vec<TagId>,
    pub version: ConcurrencyToken,
}

impl Article {
    pub fn draft(new: NewArticle) -> Self {
        Self {
            id: ArticleId::new(),
            title: new.title,
            slug: new.slug,
            summary: new.summary,
            content: new.content,
            seo: new.seo,
            author_id: new.author_id,
            created_at: new.created_at,
            updated_at: new.created_at,
            status: ArticleStatus::Draft,
            published_at: None,
            tag_ids: dedupe(new.tag_ids),
            version: ConcurrencyToken::unsaved(),
        }
    }

    pub fn restore(parts: ArticleParts) -> DomainResult<Self> {
        match (parts.status, parts.published_at) {
            (ArticleStatus::Draft, Some(_)) => {
                return Err(DomainError::persistence(format!(
                    "draft article {} carries a published date",
                    parts.id
                )));
            }
            (ArticleStatus::Published, None) => {
                return Err(DomainError::persistence(format!(
                    "published article {} has no published date",
                    parts.id
                )));
            }
            _ => {}
        }

        Ok(Self {
            id: parts.id,
            title: parts.title,
            slug: parts.slug,
            summary: parts.summary,
            content: parts.content,
            seo: parts.seo,
            author_id: parts.author_id,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            status: parts.status,
            published_at: parts.published_at,
            tag_ids: dedupe(parts.tag_ids),
            version: parts.version,
        })
    }

    pub const fn status(&self) -> ArticleStatus {
        self.status
    }

    pub const fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    pub const fn version(&self) -> ConcurrencyToken {
        self.version
    }

    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    /// Pin the token the caller last observed so the next write is checked
    /// against it rather than against the freshly loaded one.
    #[must_use]
    pub fn with_expected_version(mut self, version: ConcurrencyToken) -> Self {
        self.version = version;
        self
    }

    /// Legal from every state. Publishing an already published article
    /// refreshes `published_at`.
    pub fn publish(&mut self, now: DateTime<Utc>) -> ArticleEvent {
        let republished = self.status == ArticleStatus::Published;
        self.status = ArticleStatus::Published;
        self.published_at = Some(now);
        self.updated_at = now;
        ArticleEvent::Published {
            id: self.id,
            at: now,
            republished,
        }
    }

    pub fn unpublish(&mut self, now: DateTime<Utc>) -> DomainResult<ArticleEvent> {
        if self.status != ArticleStatus::Published {
            return Err(DomainError::validation(format!(
                "cannot unpublish an article that is {}",
                self.status
            )));
        }
        self.status = ArticleStatus::Draft;
        self.published_at = None;
        self.updated_at = now;
        Ok(ArticleEvent::Unpublished {
            id: self.id,
            at: now,
        })
    }

    /// Legal from every state; `published_at` is left untouched.
    pub fn archive(&mut self, now: DateTime<Utc>) -> ArticleEvent {
        self.status = ArticleStatus::Archived;
        self.updated_at = now;
        ArticleEvent::Archived {
            id: self.id,
            at: now,
        }
    }

    pub fn set_content(
        &mut self,
        title: ArticleTitle,
        content: ArticleContent,
        summary: Option<ArticleSummary>,
        now: DateTime<Utc>,
    ) {
        self.title = title;
        self.content = content;
        self.summary = summary;
        self.updated_at = now;
    }

    pub fn set_slug(&mut self, slug: ArticleSlug, now: DateTime<Utc>) {
        self.slug = slug;
        self.updated_at = now;
    }

    pub fn set_seo(&mut self, seo: SeoMetadata, now: DateTime<Utc>) {
        self.seo = seo;
        self.updated_at = now;
    }

    /// Replace the ordered tag list; repeated tags keep their first position.
    pub fn set_tags(&mut self, tag_ids: Vec<TagId>, now: DateTime<Utc>) {
        self.tag_ids = dedupe(tag_ids);
        self.updated_at = now;
    }

    pub(crate) fn detach_tag(&mut self, tag_id: TagId) {
        self.tag_ids.retain(|id| *id != tag_id);
    }
}

fn dedupe(tag_ids: Vec<TagId>) -> Vec<TagId> {
    let mut unique = Vec::with_capacity(tag_ids.len());
    for id in tag_ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleColumn {
    Id,
    Title,
    Slug,
    Summary,
    Content,
    Status,
    CreatedAt,
    UpdatedAt,
    PublishedAt,
    MetaTitle,
    MetaDescription,
    MetaKeywords,
    AuthorId,
    Tags,
}

impl Column for ArticleColumn {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Title,
        Self::Slug,
        Self::Summary,
        Self::Content,
        Self::Status,
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::PublishedAt,
        Self::MetaTitle,
        Self::MetaDescription,
        Self::MetaKeywords,
        Self::AuthorId,
        Self::Tags,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Slug => "slug",
            Self::Summary => "summary",
            Self::Content => "content",
            Self::Status => "status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::PublishedAt => "published_at",
            Self::MetaTitle => "meta_title",
            Self::MetaDescription => "meta_description",
            Self::MetaKeywords => "meta_keywords",
            Self::AuthorId => "author_id",
            Self::Tags => "tags",
        }
    }

    fn is_virtual(self) -> bool {
        self == Self::Tags
    }
}

impl Entity for Article {
    type Id = ArticleId;
    type Column = ArticleColumn;

    const KIND: EntityKind = EntityKind::Article;

    fn id(&self) -> ArticleId {
        self.id
    }

    fn concurrency_token(&self) -> Option<ConcurrencyToken> {
        Some(self.version)
    }

    fn assign_concurrency_token(&mut self, token: ConcurrencyToken) {
        self.version = token;
    }

    fn field(&self, column: ArticleColumn) -> FieldValue {
        match column {
            ArticleColumn::Id => self.id.into(),
            ArticleColumn::Title => self.title.as_str().into(),
            ArticleColumn::Slug => self.slug.as_str().into(),
            ArticleColumn::Summary => self.summary.as_ref().map(ArticleSummary::as_str).into(),
            ArticleColumn::Content => self.content.as_str().into(),
            ArticleColumn::Status => self.status.into(),
            ArticleColumn::CreatedAt => self.created_at.into(),
            ArticleColumn::UpdatedAt => self.updated_at.into(),
            ArticleColumn::PublishedAt => self.published_at.into(),
            ArticleColumn::MetaTitle => self.seo.meta_title.clone().into(),
            ArticleColumn::MetaDescription => self.seo.meta_description.clone().into(),
            ArticleColumn::MetaKeywords => self.seo.meta_keywords.clone().into(),
            ArticleColumn::AuthorId => self.author_id.into(),
            ArticleColumn::Tags => {
                FieldValue::UuidList(self.tag_ids.iter().map(TagId::as_uuid).collect())
            }
        }
    }

    fn into_record(self) -> Record {
        Record::Article(self)
    }

    fn from_record(record: Record) -> DomainResult<Self> {
        match record {
            Record::Article(article) => Ok(article),
            other => Err(unexpected_record(EntityKind::Article, &other)),
        }
    }
}
