//! In-memory store backend
//!
//! Used for tests and ephemeral sessions. Read and write failures can be
//! injected to exercise the guard's best-effort paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, SecretStore};
use crate::error::StoreError;

/// Map-backed store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write or delete fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Whether a key is present (bypasses failure injection)
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn erase(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.read(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.erase(key).await
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.read(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.erase(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        SecretStore::set(&store, "k", "v").await.unwrap();
        assert_eq!(SecretStore::get(&store, "k").await.unwrap().as_deref(), Some("v"));

        SecretStore::delete(&store, "k").await.unwrap();
        assert!(SecretStore::get(&store, "k").await.unwrap().is_none());

        // Deleting again is fine
        SecretStore::delete(&store, "k").await.unwrap();
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        RecordStore::set(&store, "k", "v").await.unwrap();

        store.fail_reads(true);
        assert!(RecordStore::get(&store, "k").await.is_err());
        store.fail_reads(false);

        store.fail_writes(true);
        assert!(RecordStore::set(&store, "k", "w").await.is_err());
        assert!(RecordStore::remove(&store, "k").await.is_err());
        store.fail_writes(false);

        assert_eq!(RecordStore::get(&store, "k").await.unwrap().as_deref(), Some("v"));
    }
}
