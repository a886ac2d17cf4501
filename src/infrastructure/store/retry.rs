use crate::config::RetryConfig;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::persistence::{
    ColumnName, EntityKind, FieldValue, Mutation, Predicate, Query, Record, Store, StoreProvider,
    StoreTransaction,
};
use async_trait::async_trait;
use std::future::Future;

/// Retries [`DomainError::Connectivity`] failures of the wrapped store with
/// capped exponential backoff and escalates them to
/// [`DomainError::Persistence`] once the attempts run out. Every other error
/// passes through untouched.
///
/// Work inside an open transaction is never retried because the connection
/// that held it is gone; those failures escalate immediately.
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryConfig,
}

impl<S: Store> RetryingStore<S> {
    pub const fn new(inner: S, policy: RetryConfig) -> Self {
        Self { inner, policy }
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }

    async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> DomainResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = DomainResult<T>> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Err(err) if err.is_transient() => {
                    if attempt >= self.policy.max_attempts {
                        tracing::error!(
                            operation,
                            attempts = attempt,
                            error = %err,
                            "store still unreachable, giving up"
                        );
                        return Err(escalate(err, attempt));
                    }
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient store failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

fn escalate(err: DomainError, attempts: u32) -> DomainError {
    match err {
        DomainError::Connectivity(reason) => DomainError::persistence(format!(
            "store unreachable after {attempts} attempt(s): {reason}"
        )),
        other => other,
    }
}

fn no_retry<T>(result: DomainResult<T>) -> DomainResult<T> {
    result.map_err(|err| {
        if err.is_transient() {
            tracing::error!(error = %err, "connection lost inside a transaction");
        }
        escalate(err, 1)
    })
}

#[async_trait]
impl<S: Store> Store for RetryingStore<S> {
    fn provider(&self) -> StoreProvider {
        self.inner.provider()
    }

    async fn fetch(&self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        self.run("fetch", || self.inner.fetch(kind, query)).await
    }

    async fn count(
        &self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        self.run("count", || self.inner.count(kind, filter)).await
    }

    async fn apply(&self, mutations: &[Mutation]) -> DomainResult<u64> {
        self.run("apply", || self.inner.apply(mutations)).await
    }

    async fn execute_raw(&self, statement: &str, params: &[FieldValue]) -> DomainResult<u64> {
        self.run("execute_raw", || self.inner.execute_raw(statement, params))
            .await
    }

    /// Probes are answered once; a health check should report the outage, not
    /// wait it out.
    async fn ping(&self) -> DomainResult<()> {
        self.inner.ping().await
    }

    async fn begin(&self) -> DomainResult<Box<dyn StoreTransaction>> {
        let inner = self.run("begin", || self.inner.begin()).await?;
        Ok(Box::new(EscalatingTransaction { inner }))
    }
}

struct EscalatingTransaction {
    inner: Box<dyn StoreTransaction>,
}

#[async_trait]
impl StoreTransaction for EscalatingTransaction {
    async fn fetch(&mut self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        no_retry(self.inner.fetch(kind, query).await)
    }

    async fn count(
        &mut self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        no_retry(self.inner.count(kind, filter).await)
    }

    async fn apply(&mut self, mutations: &[Mutation]) -> DomainResult<u64> {
        no_retry(self.inner.apply(mutations).await)
    }

    async fn execute_raw(&mut self, statement: &str, params: &[FieldValue]) -> DomainResult<u64> {
        no_retry(self.inner.execute_raw(statement, params).await)
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        no_retry(self.inner.commit().await)
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        no_retry(self.inner.rollback().await)
    }
}
