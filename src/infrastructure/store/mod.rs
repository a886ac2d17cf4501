//! [`Store`] adapters and the provider switch that builds one from
//! configuration.

mod memory;
pub mod postgres;
mod retry;

pub use memory::{InMemoryStore, InMemoryTransaction};
pub use postgres::PgStore;
pub use retry::RetryingStore;

use crate::config::{AppConfig, ConfigError};
use crate::domain::article::ArticleColumn;
use crate::domain::comment::CommentColumn;
use crate::domain::errors::DomainError;
use crate::domain::media::MediaFileColumn;
use crate::domain::persistence::{Column, EntityKind, Store, StoreProvider};
use crate::domain::project::ProjectColumn;
use crate::domain::tag::TagColumn;
use crate::infrastructure::database;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] DomainError),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Whether `name` is a queryable column of `kind`.
pub(crate) fn column_exists(kind: EntityKind, name: &str) -> bool {
    match kind {
        EntityKind::Article => ArticleColumn::from_name(name).is_some(),
        EntityKind::Comment => CommentColumn::from_name(name).is_some(),
        EntityKind::Tag => TagColumn::from_name(name).is_some(),
        EntityKind::Project => ProjectColumn::from_name(name).is_some(),
        EntityKind::MediaFile => MediaFileColumn::from_name(name).is_some(),
    }
}

/// Build the configured store, wrapped in the retry policy. Postgres pools
/// are migrated before they are handed out when `migrate` is set.
pub async fn connect(config: &AppConfig, migrate: bool) -> Result<Arc<dyn Store>, ConnectError> {
    let provider = config.store_provider();
    tracing::info!(%provider, "connecting store");

    let store: Arc<dyn Store> = match provider {
        StoreProvider::Memory => Arc::new(InMemoryStore::new()),
        StoreProvider::Postgres => {
            let pool = database::init_pool(config.database_url()?, config.max_connections())
                .await
                .map_err(postgres::map_sqlx)?;
            if migrate {
                database::run_migrations(&pool).await?;
                tracing::info!("migrations applied");
            }
            Arc::new(RetryingStore::new(PgStore::new(pool), config.retry()))
        }
    };
    Ok(store)
}
