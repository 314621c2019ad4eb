//! Per-identity failed-attempt state
//!
//! Both entries live in the confidential store, keyed by the sanitized
//! identity:
//!
//! - `failed_attempts_{id}` - decimal failure count
//! - `lockout_time_{id}` - lockout deadline, epoch milliseconds
//!
//! Storage errors never escape this module. A failed read is "no data" and a
//! failed write is logged and dropped.

use std::sync::Arc;

use tracing::warn;

use crate::store::{prefixed, SecretStore, FAILED_ATTEMPTS_PREFIX, LOCKOUT_TIME_PREFIX};

/// Failure counter and lockout deadline for sanitized identities
#[derive(Clone)]
pub struct AttemptTracker {
    store: Arc<dyn SecretStore>,
}

impl AttemptTracker {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Current failure count; 0 when absent or unreadable
    pub async fn failed_count(&self, id: &str) -> u32 {
        self.read_number(&prefixed(FAILED_ATTEMPTS_PREFIX, id))
            .await
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Record one more failure and return the new count
    pub async fn increment(&self, id: &str) -> u32 {
        let count = self.failed_count(id).await.saturating_add(1);
        self.write(&prefixed(FAILED_ATTEMPTS_PREFIX, id), &count.to_string())
            .await;
        count
    }

    /// Forget all failures and any lockout deadline
    pub async fn reset(&self, id: &str) {
        self.delete(&prefixed(FAILED_ATTEMPTS_PREFIX, id)).await;
        self.delete(&prefixed(LOCKOUT_TIME_PREFIX, id)).await;
    }

    /// Stored lockout deadline (epoch millis), if any
    pub async fn lockout_until(&self, id: &str) -> Option<i64> {
        self.read_number(&prefixed(LOCKOUT_TIME_PREFIX, id)).await
    }

    /// Store the lockout deadline (epoch millis)
    pub async fn set_lockout_until(&self, id: &str, until_millis: i64) {
        self.write(&prefixed(LOCKOUT_TIME_PREFIX, id), &until_millis.to_string())
            .await;
    }

    async fn read_number(&self, key: &str) -> Option<i64> {
        match self.store.get(key).await {
            Ok(Some(raw)) => raw.trim().parse().ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            warn!("Failed to write {}: {}", key, e);
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!("Failed to delete {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_absent_count_is_zero() {
        let tracker = AttemptTracker::new(Arc::new(MemoryStore::new()));
        assert_eq!(tracker.failed_count("jane_example_com").await, 0);
    }

    #[tokio::test]
    async fn test_increment_and_reset() {
        let store = Arc::new(MemoryStore::new());
        let tracker = AttemptTracker::new(store.clone());

        assert_eq!(tracker.increment("id").await, 1);
        assert_eq!(tracker.increment("id").await, 2);
        assert_eq!(tracker.failed_count("id").await, 2);
        assert!(store.contains("failed_attempts_id").await);

        tracker.set_lockout_until("id", 1_000).await;
        tracker.reset("id").await;
        assert_eq!(tracker.failed_count("id").await, 0);
        assert!(tracker.lockout_until("id").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_counts_are_per_identity() {
        let tracker = AttemptTracker::new(Arc::new(MemoryStore::new()));
        tracker.increment("a").await;
        tracker.increment("a").await;
        tracker.increment("b").await;

        assert_eq!(tracker.failed_count("a").await, 2);
        assert_eq!(tracker.failed_count("b").await, 1);
    }

    #[tokio::test]
    async fn test_read_failure_is_zero() {
        let store = Arc::new(MemoryStore::new());
        let tracker = AttemptTracker::new(store.clone());
        tracker.increment("id").await;

        store.fail_reads(true);
        assert_eq!(tracker.failed_count("id").await, 0);
        assert!(tracker.lockout_until("id").await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_count_is_zero() {
        let store = Arc::new(MemoryStore::new());
        SecretStore::set(store.as_ref(), "failed_attempts_id", "lots")
            .await
            .unwrap();

        let tracker = AttemptTracker::new(store);
        assert_eq!(tracker.failed_count("id").await, 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes(true);

        let tracker = AttemptTracker::new(store);
        assert_eq!(tracker.increment("id").await, 1);
        tracker.reset("id").await;
    }
}
