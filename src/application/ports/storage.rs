// src/application/ports/storage.rs
use crate::application::ApplicationResult;
use async_trait::async_trait;

/// Where uploaded bytes ended up. `url` is opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub stored_name: String,
    pub url: String,
}

/// External blob storage for media bytes.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn store(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ApplicationResult<StoredObject>;

    async fn remove(&self, stored_name: &str) -> ApplicationResult<()>;
}
