use super::value::FieldValue;
use crate::domain::article::Article;
use crate::domain::comment::Comment;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::ConcurrencyToken;
use crate::domain::media::MediaFile;
use crate::domain::project::Project;
use crate::domain::tag::Tag;
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// Queryable column of one entity type.
pub trait Column: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|column| column.name() == name)
    }

    /// Columns materialised outside the entity's own table (join rows).
    fn is_virtual(self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Article,
    Comment,
    Tag,
    Project,
    MediaFile,
}

impl EntityKind {
    pub const fn table(self) -> &'static str {
        match self {
            Self::Article => "articles",
            Self::Comment => "comments",
            Self::Tag => "tags",
            Self::Project => "projects",
            Self::MediaFile => "media_files",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Comment => "comment",
            Self::Tag => "tag",
            Self::Project => "project",
            Self::MediaFile => "media file",
        }
    }

    /// Kinds whose rows carry a store-assigned concurrency token.
    pub const fn is_versioned(self) -> bool {
        matches!(self, Self::Article | Self::Comment | Self::Project)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An entity type the persistence gateway can manage.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + Into<Uuid> + From<Uuid>;
    type Column: Column;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;

    fn concurrency_token(&self) -> Option<ConcurrencyToken> {
        None
    }

    /// Called by stores after a successful write.
    fn assign_concurrency_token(&mut self, _token: ConcurrencyToken) {}

    fn field(&self, column: Self::Column) -> FieldValue;

    fn into_record(self) -> Record;

    fn from_record(record: Record) -> DomainResult<Self>;
}

/// Type-erased entity state travelling through the store port.
#[derive(Debug, Clone)]
pub enum Record {
    Article(Article),
    Comment(Comment),
    Tag(Tag),
    Project(Project),
    MediaFile(MediaFile),
}

macro_rules! with_entity {
    ($record:expr, $entity:ident => $body:expr) => {
        match $record {
            Record::Article($entity) => $body,
            Record::Comment($entity) => $body,
            Record::Tag($entity) => $body,
            Record::Project($entity) => $body,
            Record::MediaFile($entity) => $body,
        }
    };
}

fn lookup<E: Entity>(entity: &E, name: &str) -> Option<FieldValue> {
    E::Column::from_name(name).map(|column| entity.field(column))
}

fn stored_fields<E: Entity>(entity: &E) -> Vec<(&'static str, FieldValue)> {
    E::Column::ALL
        .iter()
        .copied()
        .filter(|column| !column.is_virtual())
        .map(|column| (column.name(), entity.field(column)))
        .collect()
}

impl Record {
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Article(_) => EntityKind::Article,
            Self::Comment(_) => EntityKind::Comment,
            Self::Tag(_) => EntityKind::Tag,
            Self::Project(_) => EntityKind::Project,
            Self::MediaFile(_) => EntityKind::MediaFile,
        }
    }

    pub fn id(&self) -> Uuid {
        with_entity!(self, e => e.id().into())
    }

    pub fn concurrency_token(&self) -> Option<ConcurrencyToken> {
        with_entity!(self, e => e.concurrency_token())
    }

    pub fn assign_concurrency_token(&mut self, token: ConcurrencyToken) {
        with_entity!(self, e => e.assign_concurrency_token(token));
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        with_entity!(self, e => lookup(e, name))
    }

    /// Column/value pairs stored in the entity's own table, in column order.
    pub fn stored_fields(&self) -> Vec<(&'static str, FieldValue)> {
        with_entity!(self, e => stored_fields(e))
    }
}

pub(crate) fn unexpected_record(expected: EntityKind, actual: &Record) -> DomainError {
    DomainError::persistence(format!(
        "expected {expected} record, store returned {}",
        actual.kind()
    ))
}
