//! Partially completed registration
//!
//! A multi-step registration form can park what it has so far under
//! [`PARTIAL_REGISTRATION_KEY`] and pick it up again after a restart.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GuardError, Result};
use crate::store::{RecordStore, PARTIAL_REGISTRATION_KEY};

/// Registration form state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Form step the user reached
    #[serde(default)]
    pub step: u32,
}

/// Store for the single in-progress registration
#[derive(Clone)]
pub struct RegistrationDraftStore {
    store: Arc<dyn RecordStore>,
}

impl RegistrationDraftStore {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, draft: &RegistrationDraft) -> Result<()> {
        let contents = serde_json::to_string(draft)
            .map_err(|e| GuardError::StorageWriteFailed(e.to_string()))?;

        self.store
            .set(PARTIAL_REGISTRATION_KEY, &contents)
            .await
            .map_err(|e| {
                GuardError::StorageWriteFailed(format!("Failed to save partial registration: {}", e))
            })?;

        debug!("Saved registration draft at step {}", draft.step);
        Ok(())
    }

    /// Stored draft; missing or unreadable is `None`
    pub async fn load(&self) -> Option<RegistrationDraft> {
        let raw = match self.store.get(PARTIAL_REGISTRATION_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Error getting partial registration: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                warn!("Discarding unreadable registration draft: {}", e);
                None
            }
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(PARTIAL_REGISTRATION_KEY).await {
            warn!("Error clearing partial registration: {}", e);
        }
    }
}
