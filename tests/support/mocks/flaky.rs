// tests/support/mocks/flaky.rs
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use folio_core::domain::errors::{DomainError, DomainResult};
use folio_core::domain::persistence::{
    ColumnName, EntityKind, FieldValue, Mutation, Predicate, Query, Record, Store, StoreProvider,
    StoreTransaction,
};
use folio_core::infrastructure::store::InMemoryStore;

/// In-memory store whose first `failures` calls fail with a connectivity
/// error. `ping` never fails.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    failures: AtomicU32,
    calls: AtomicU32,
}

impl FlakyStore {
    pub fn failing(times: u32) -> Self {
        Self {
            failures: AtomicU32::new(times),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self, times: u32) {
        self.failures.store(times, Ordering::SeqCst);
    }

    fn trip(&self) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match remaining {
            Ok(_) => Err(DomainError::Connectivity("connection reset by peer".into())),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl Store for FlakyStore {
    fn provider(&self) -> StoreProvider {
        StoreProvider::Memory
    }

    async fn fetch(&self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        self.trip()?;
        self.inner.fetch(kind, query).await
    }

    async fn count(
        &self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        self.trip()?;
        self.inner.count(kind, filter).await
    }

    async fn apply(&self, mutations: &[Mutation]) -> DomainResult<u64> {
        self.trip()?;
        self.inner.apply(mutations).await
    }

    async fn execute_raw(&self, statement: &str, params: &[FieldValue]) -> DomainResult<u64> {
        self.trip()?;
        self.inner.execute_raw(statement, params).await
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }

    async fn begin(&self) -> DomainResult<Box<dyn StoreTransaction>> {
        self.trip()?;
        self.inner.begin().await
    }
}
