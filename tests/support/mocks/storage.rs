// tests/support/mocks/storage.rs
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use folio_core::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::storage::{MediaStorage, StoredObject},
};

/// Blob storage kept in a map. `fail_next_store` makes the next upload fail.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_next_store: Mutex<bool>,
}

impl MemoryStorage {
    pub fn contains(&self, stored_name: &str) -> bool {
        self.objects.lock().unwrap().contains_key(stored_name)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn fail_next_store(&self) {
        *self.fail_next_store.lock().unwrap() = true;
    }
}

#[async_trait]
impl MediaStorage for MemoryStorage {
    async fn store(
        &self,
        original_name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> ApplicationResult<StoredObject> {
        if std::mem::take(&mut *self.fail_next_store.lock().unwrap()) {
            return Err(ApplicationError::infrastructure("storage offline"));
        }
        let extension = original_name.rsplit_once('.').map_or("bin", |(_, ext)| ext);
        let stored_name = format!("{}.{extension}", uuid::Uuid::new_v4().simple());
        self.objects
            .lock()
            .unwrap()
            .insert(stored_name.clone(), bytes);
        Ok(StoredObject {
            url: format!("https://cdn.test/{stored_name}"),
            stored_name,
        })
    }

    async fn remove(&self, stored_name: &str) -> ApplicationResult<()> {
        self.objects.lock().unwrap().remove(stored_name);
        Ok(())
    }
}
