//! User record collection
//!
//! All users live in one JSON array under [`USER_DATA_KEY`] in the general
//! store. A blob that is missing or not an array reads as an empty
//! collection. An unparsable blob reads as empty but blocks saves.
//!
//! Entries are decoded one at a time: an entry that does not decode is
//! skipped on read and written back untouched on save.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::error::{GuardError, Result, StoreError};
use crate::identity::record_key;
use crate::store::{RecordStore, USER_DATA_KEY};
use crate::user::User;

/// Repository of user records
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn RecordStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Load every stored user, in insertion order
    ///
    /// Read failures are treated as "no users".
    pub async fn all(&self) -> Vec<User> {
        match self.try_all().await {
            Ok(users) => users,
            Err(e) => {
                warn!("Failed to read user records: {}", e);
                Vec::new()
            }
        }
    }

    /// Find the user with exactly this identity
    pub async fn get(&self, identity: &str) -> Option<User> {
        let key = record_key(identity);
        self.all().await.into_iter().find(|u| u.email == key)
    }

    /// First stored user, if any
    pub async fn first(&self) -> Option<User> {
        self.all().await.into_iter().next()
    }

    /// Insert or replace the record with the same email
    pub async fn save(&self, user: &User) -> Result<()> {
        self.try_save(user)
            .await
            .map_err(|e| GuardError::StorageWriteFailed(format!("Failed to save user data: {}", e)))
    }

    async fn try_all(&self) -> std::result::Result<Vec<User>, StoreError> {
        Ok(decode_users(self.load_entries().await?))
    }

    async fn load_entries(&self) -> std::result::Result<Vec<Value>, StoreError> {
        let Some(raw) = self.store.get(USER_DATA_KEY).await? else {
            return Ok(Vec::new());
        };
        parse_entries(&raw)
    }

    async fn try_save(&self, user: &User) -> std::result::Result<(), StoreError> {
        let mut entries = self.load_entries().await?;
        let encoded = serde_json::to_value(user)?;

        let existing = entries
            .iter_mut()
            .find(|entry| entry.get("email").and_then(Value::as_str) == Some(user.email.as_str()));
        match existing {
            Some(entry) => *entry = encoded,
            None => entries.push(encoded),
        }

        let contents = serde_json::to_string(&entries)?;
        self.store.set(USER_DATA_KEY, &contents).await
    }
}

/// Split the collection blob into entries; anything other than an array is empty
fn parse_entries(raw: &str) -> std::result::Result<Vec<Value>, StoreError> {
    match serde_json::from_str(raw)? {
        Value::Array(entries) => Ok(entries),
        _ => Ok(Vec::new()),
    }
}

/// Decode each entry, skipping the ones that are not valid user records
fn decode_users(entries: Vec<Value>) -> Vec<User> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Skipping unreadable user record at index {}: {}", index, e);
                None
            }
        })
        .collect()
}
