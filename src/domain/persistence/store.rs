use super::entity::{EntityKind, Record};
use super::query::{ColumnName, Predicate, Query};
use super::value::FieldValue;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::ConcurrencyToken;
use async_trait::async_trait;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Backing store selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreProvider {
    Postgres,
    Memory,
}

impl StoreProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreProvider {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(DomainError::validation(format!(
                "unknown store provider `{other}`"
            ))),
        }
    }
}

/// One staged write, committed atomically with its siblings.
#[derive(Debug, Clone)]
pub enum Mutation {
    Insert(Record),
    Update(Record),
    Delete {
        kind: EntityKind,
        id: Uuid,
        expected: Option<ConcurrencyToken>,
    },
}

impl Mutation {
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Insert(record) | Self::Update(record) => record.kind(),
            Self::Delete { kind, .. } => *kind,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Insert(record) | Self::Update(record) => record.id(),
            Self::Delete { id, .. } => *id,
        }
    }
}

/// Transactional relational store consumed by the unit of work.
///
/// `apply` is all-or-nothing: either every mutation lands or none does.
/// Updates and deletes of versioned kinds compare the supplied token with the
/// stored one and fail with [`DomainError::ConcurrencyConflict`] on mismatch
/// or when the row has disappeared.
#[async_trait]
pub trait Store: Send + Sync {
    fn provider(&self) -> StoreProvider;

    async fn fetch(&self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>>;

    async fn count(
        &self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64>;

    async fn apply(&self, mutations: &[Mutation]) -> DomainResult<u64>;

    async fn execute_raw(&self, statement: &str, params: &[FieldValue]) -> DomainResult<u64>;

    async fn ping(&self) -> DomainResult<()>;

    async fn begin(&self) -> DomainResult<Box<dyn StoreTransaction>>;
}

/// An open transaction. Dropping it without `commit` rolls it back.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn fetch(&mut self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>>;

    async fn count(
        &mut self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64>;

    async fn apply(&mut self, mutations: &[Mutation]) -> DomainResult<u64>;

    async fn execute_raw(&mut self, statement: &str, params: &[FieldValue])
    -> DomainResult<u64>;

    async fn commit(self: Box<Self>) -> DomainResult<()>;

    async fn rollback(self: Box<Self>) -> DomainResult<()>;
}
