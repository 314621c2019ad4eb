//! Credential storage
//!
//! Credentials are kept as a `{"email", "password"}` JSON blob under
//! `credentials_{secret_key(identity)}` in the confidential store. The
//! secret is stored as given; any hashing belongs behind [`SecretStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{GuardError, Result};
use crate::identity::secret_key;
use crate::store::{prefixed, SecretStore, CREDENTIALS_PREFIX};

/// Stored (identity, secret) pair
///
/// The secret is wiped from memory when the value is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    #[zeroize(skip)]
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Compare a presented secret against the stored one
    pub fn matches(&self, secret: &str) -> bool {
        self.password == secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credential lookups over the confidential store
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn SecretStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    fn key(identity: &str) -> String {
        prefixed(CREDENTIALS_PREFIX, &secret_key(identity))
    }

    /// Save credentials; an existing entry for the identity is overwritten
    pub async fn save(&self, identity: &str, secret: &str) -> Result<()> {
        let credentials = Credentials {
            email: identity.to_string(),
            password: secret.to_string(),
        };
        let blob = serde_json::to_string(&credentials)
            .map_err(|e| GuardError::StorageWriteFailed(format!("Failed to save credentials: {}", e)))?;

        self.store
            .set(&Self::key(identity), &blob)
            .await
            .map_err(|e| GuardError::StorageWriteFailed(format!("Failed to save credentials: {}", e)))
    }

    /// Look up credentials; read or parse failures read as absent
    pub async fn get(&self, identity: &str) -> Option<Credentials> {
        let blob = match self.store.get(&Self::key(identity)).await {
            Ok(blob) => blob?,
            Err(e) => {
                warn!("Failed to read credentials for {}: {}", secret_key(identity), e);
                return None;
            }
        };

        match serde_json::from_str(&blob) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!("Malformed credentials for {}: {}", secret_key(identity), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_save_and_get() {
        let store = Arc::new(MemoryStore::new());
        let creds = CredentialStore::new(store.clone());

        creds.save("jane@example.com", "Secret123").await.unwrap();
        assert!(store.contains("credentials_jane_example_com").await);

        let loaded = creds.get("jane@example.com").await.unwrap();
        assert_eq!(loaded.email, "jane@example.com");
        assert!(loaded.matches("Secret123"));
        assert!(!loaded.matches("secret123"));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        creds.save("jane@example.com", "First123").await.unwrap();
        creds.save("jane@example.com", "Second123").await.unwrap();

        assert!(creds.get("jane@example.com").await.unwrap().matches("Second123"));
    }

    #[tokio::test]
    async fn test_unknown_identity_is_absent() {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        assert!(creds.get("nobody@example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_read_failure_is_absent() {
        let store = Arc::new(MemoryStore::new());
        let creds = CredentialStore::new(store.clone());
        creds.save("jane@example.com", "Secret123").await.unwrap();

        store.fail_reads(true);
        assert!(creds.get("jane@example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes(true);

        let creds = CredentialStore::new(store);
        assert!(matches!(
            creds.save("jane@example.com", "Secret123").await,
            Err(GuardError::StorageWriteFailed(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials {
            email: "a@b.co".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
