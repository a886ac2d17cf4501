use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::persistence::entity::unexpected_record;
use crate::domain::persistence::{Column, Entity, EntityKind, FieldValue, Record};
use crate::domain::slug::{self, MAX_SLUG_LEN};
use chrono::{DateTime, Utc};
use std::fmt;

pub use crate::domain::ids::TagId;

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagName(String);

impl TagName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::Validation("tag name cannot be empty".into()));
        }
        if value.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::Validation(format!(
                "tag name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSlug(String);

impl TagSlug {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if !slug::is_valid(&value) || value.len() > MAX_SLUG_LEN {
            return Err(DomainError::Validation(format!(
                "`{value}` is not a valid tag slug"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: TagId,
    pub name: TagName,
    pub slug: TagSlug,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(
        name: TagName,
        slug: TagSlug,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: TagId::new(),
            name,
            slug,
            description: normalize_description(description)?,
            created_at,
        })
    }

    pub fn rename(&mut self, name: TagName, slug: TagSlug) {
        self.name = name;
        self.slug = slug;
    }

    pub fn set_description(&mut self, description: Option<String>) -> DomainResult<()> {
        self.description = normalize_description(description)?;
        Ok(())
    }
}

fn normalize_description(description: Option<String>) -> DomainResult<Option<String>> {
    match description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
    {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(DomainError::Validation(
            format!("tag description cannot exceed {MAX_DESCRIPTION_LEN} characters"),
        )),
        other => Ok(other),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagColumn {
    Id,
    Name,
    Slug,
    Description,
    CreatedAt,
}

impl Column for TagColumn {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Slug,
        Self::Description,
        Self::CreatedAt,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Slug => "slug",
            Self::Description => "description",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Entity for Tag {
    type Id = TagId;
    type Column = TagColumn;

    const KIND: EntityKind = EntityKind::Tag;

    fn id(&self) -> TagId {
        self.id
    }

    fn field(&self, column: TagColumn) -> FieldValue {
        match column {
            TagColumn::Id => self.id.into(),
            TagColumn::Name => self.name.as_str().into(),
            TagColumn::Slug => self.slug.as_str().into(),
            TagColumn::Description => self.description.clone().into(),
            TagColumn::CreatedAt => self.created_at.into(),
        }
    }

    fn into_record(self) -> Record {
        Record::Tag(self)
    }

    fn from_record(record: Record) -> DomainResult<Self> {
        match record {
            Record::Tag(tag) => Ok(tag),
            other => Err(unexpected_record(EntityKind::Tag, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_slug_rejects_long_or_malformed_values() {
        assert!(TagSlug::new("c-net").is_ok());
        assert!(TagSlug::new("C-Net").is_err());
        assert!(TagSlug::new("a".repeat(51)).is_err());
    }

    #[test]
    fn names_may_outgrow_the_slug() {
        assert!(TagName::new("x".repeat(MAX_SLUG_LEN + 10)).is_ok());
        assert!(TagName::new("x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn description_is_optional_and_bounded() {
        let tag = Tag::new(
            TagName::new("Rust").unwrap(),
            TagSlug::new("rust").unwrap(),
            Some("  ".into()),
            Utc::now(),
        )
        .unwrap();
        assert!(tag.description.is_none());

        let mut tag = tag;
        assert!(tag.set_description(Some("d".repeat(201))).is_err());
    }
}
