//! Key/value store collaborators
//!
//! Two stores back the guard:
//!
//! - [`SecretStore`] - confidential: credentials, attempt counters, lockout
//!   timestamps and the session marker
//! - [`RecordStore`] - general purpose: user records, notification feed,
//!   registration drafts and preference flags
//!
//! Both are opaque string blobs under string keys. [`MemoryStore`] and
//! [`FileStore`] implement both traits.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;

/// Session marker key (confidential store)
pub const CURRENT_USER_KEY: &str = "current_user";
/// Prefix of per-identity credential entries (confidential store)
pub const CREDENTIALS_PREFIX: &str = "credentials";
/// Prefix of per-identity failure counters (confidential store)
pub const FAILED_ATTEMPTS_PREFIX: &str = "failed_attempts";
/// Prefix of per-identity lockout deadlines (confidential store)
pub const LOCKOUT_TIME_PREFIX: &str = "lockout_time";

/// User record collection key (general store)
pub const USER_DATA_KEY: &str = "user_data";
/// Notification feed key (general store)
pub const NOTIFICATIONS_KEY: &str = "fomo_notifications";
/// Registration draft key (general store)
pub const PARTIAL_REGISTRATION_KEY: &str = "partial_registration";
/// Biometric preference flag key (general store)
pub const BIOMETRIC_ENABLED_KEY: &str = "biometricEnabled";

/// Confidential key/value store
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key; deleting an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// General-purpose key/value store
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Build a `{prefix}_{id}` key
pub(crate) fn prefixed(prefix: &str, id: &str) -> String {
    format!("{}_{}", prefix, id)
}
