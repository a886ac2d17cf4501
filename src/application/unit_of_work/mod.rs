//! Transaction coordinator: one change-tracking session shared by a
//! gateway per entity type, flushed atomically by [`UnitOfWork::save_changes`].
//!
//! A unit of work belongs to one logical operation. Create a fresh one per
//! request instead of sharing it between concurrent callers.

mod change_set;
mod repository;

pub use change_set::{ChangeSet, Staged};
pub use repository::Repository;

use crate::domain::article::Article;
use crate::domain::comment::Comment;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::media::MediaFile;
use crate::domain::persistence::{
    ColumnName, Entity, EntityKind, FieldValue, Predicate, Query, Record, Store, StoreProvider,
    StoreTransaction,
};
use crate::domain::project::Project;
use crate::domain::tag::Tag;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;

struct SessionState {
    changes: ChangeSet,
    transaction: Option<Box<dyn StoreTransaction>>,
}

/// State shared between a unit of work and the repositories it hands out.
pub(crate) struct Session {
    store: Arc<dyn Store>,
    state: Mutex<SessionState>,
}

impl Session {
    /// Reads go through the open transaction when there is one so callers see
    /// their own uncommitted writes.
    pub(crate) async fn fetch(&self, kind: EntityKind, query: Query) -> DomainResult<Vec<Record>> {
        let mut state = self.state.lock().await;
        match state.transaction.as_mut() {
            Some(tx) => tx.fetch(kind, &query).await,
            None => self.store.fetch(kind, &query).await,
        }
    }

    pub(crate) async fn count(
        &self,
        kind: EntityKind,
        filter: Option<Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        let mut state = self.state.lock().await;
        match state.transaction.as_mut() {
            Some(tx) => tx.count(kind, filter.as_ref()).await,
            None => self.store.count(kind, filter.as_ref()).await,
        }
    }

    pub(crate) async fn staged(&self, kind: EntityKind, id: uuid::Uuid) -> Option<Staged> {
        self.state.lock().await.changes.get(kind, id).cloned()
    }

    pub(crate) async fn with_changes<T>(&self, f: impl FnOnce(&mut ChangeSet) -> T) -> T {
        f(&mut self.state.lock().await.changes)
    }
}

pub struct UnitOfWork {
    session: Arc<Session>,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            session: Arc::new(Session {
                store,
                state: Mutex::new(SessionState {
                    changes: ChangeSet::default(),
                    transaction: None,
                }),
            }),
        }
    }

    pub fn provider(&self) -> StoreProvider {
        self.session.store.provider()
    }

    pub fn repository<E: Entity>(&self) -> Repository<E> {
        Repository::new(Arc::clone(&self.session))
    }

    pub fn articles(&self) -> Repository<Article> {
        self.repository()
    }

    pub fn comments(&self) -> Repository<Comment> {
        self.repository()
    }

    pub fn tags(&self) -> Repository<Tag> {
        self.repository()
    }

    pub fn projects(&self) -> Repository<Project> {
        self.repository()
    }

    pub fn media(&self) -> Repository<MediaFile> {
        self.repository()
    }

    pub async fn has_changes(&self) -> bool {
        !self.session.state.lock().await.changes.is_empty()
    }

    /// Flush every staged change in one atomic write and return the number
    /// of affected rows.
    ///
    /// The change set is cleared whether or not the write succeeds; after a
    /// [`DomainError::ConcurrencyConflict`] nothing was applied and the caller
    /// reloads before reapplying its edit.
    pub async fn save_changes(&self) -> DomainResult<u64> {
        let mut state = self.session.state.lock().await;
        flush(&self.session.store, &mut state).await
    }

    /// # Panics
    ///
    /// Panics when a transaction is already open on this unit of work.
    pub async fn begin_transaction(&self) -> DomainResult<()> {
        let mut state = self.session.state.lock().await;
        assert!(
            state.transaction.is_none(),
            "a transaction is already open on this unit of work"
        );
        state.transaction = Some(self.session.store.begin().await?);
        tracing::debug!(provider = %self.session.store.provider(), "transaction opened");
        Ok(())
    }

    /// Flush pending changes into the open transaction and commit it. Any
    /// failure rolls the whole transaction back before it is returned.
    ///
    /// # Panics
    ///
    /// Panics when no transaction is open.
    pub async fn commit_transaction(&self) -> DomainResult<()> {
        let mut state = self.session.state.lock().await;
        assert!(
            state.transaction.is_some(),
            "commit_transaction called without an open transaction"
        );

        if let Err(err) = flush(&self.session.store, &mut state).await {
            if let Some(tx) = state.transaction.take() {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed flush failed");
                }
            }
            return Err(err);
        }

        match state.transaction.take() {
            Some(tx) => {
                tx.commit().await?;
                tracing::debug!("transaction committed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Discard the open transaction and any staged changes. Without an open
    /// transaction this is a no-op.
    pub async fn rollback_transaction(&self) -> DomainResult<()> {
        let mut state = self.session.state.lock().await;
        let Some(tx) = state.transaction.take() else {
            return Ok(());
        };
        state.changes.clear();
        tx.rollback().await?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }

    pub async fn in_transaction(&self) -> bool {
        self.session.state.lock().await.transaction.is_some()
    }

    /// Liveness probe; never fails.
    pub async fn can_connect(&self) -> bool {
        match self.session.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "store is unreachable");
                false
            }
        }
    }

    /// Run a parameterised statement directly. Every `$n` placeholder must
    /// refer to a supplied parameter and every parameter must be referenced;
    /// values are bound, never spliced into `statement`.
    pub async fn execute_raw(&self, statement: &str, params: &[FieldValue]) -> DomainResult<u64> {
        check_placeholders(statement, params.len())?;
        let mut state = self.session.state.lock().await;
        match state.transaction.as_mut() {
            Some(tx) => tx.execute_raw(statement, params).await,
            None => self.session.store.execute_raw(statement, params).await,
        }
    }
}

async fn flush(store: &Arc<dyn Store>, state: &mut SessionState) -> DomainResult<u64> {
    let mutations = state.changes.take_mutations();
    if mutations.is_empty() {
        return Ok(0);
    }

    let staged = mutations.len();
    let result = match state.transaction.as_mut() {
        Some(tx) => tx.apply(&mutations).await,
        None => store.apply(&mutations).await,
    };

    match &result {
        Ok(rows) => tracing::debug!(staged, rows, "changes saved"),
        Err(DomainError::ConcurrencyConflict(reason)) => {
            tracing::warn!(staged, reason = %reason, "save rejected by concurrency check");
        }
        Err(err) => tracing::error!(staged, error = %err, "saving changes failed"),
    }
    result
}

fn check_placeholders(statement: &str, param_count: usize) -> DomainResult<()> {
    let mut referenced = BTreeSet::new();
    let bytes = statement.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                let index: usize = statement[start..end]
                    .parse()
                    .map_err(|_| DomainError::validation("placeholder index is out of range"))?;
                referenced.insert(index);
            }
            i = end;
        } else {
            i += 1;
        }
    }

    let expected: BTreeSet<usize> = (1..=param_count).collect();
    if referenced == expected {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "statement references placeholders {referenced:?} but {param_count} parameters were supplied"
        )))
    }
}
