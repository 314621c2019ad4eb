//! Session handle and persisted session marker
//!
//! The marker (`current_user` in the confidential store) is what survives
//! a restart and decides "is logged in". The [`Session`] handle is the
//! in-process view of it, created on login or register and dropped on
//! logout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local};
use tracing::warn;

use crate::store::{SecretStore, CURRENT_USER_KEY};

/// Active session for one identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Identity (email) this session belongs to
    identity: String,

    /// When the session was created
    started_at: DateTime<Local>,

    /// When the session was last used
    last_activity: DateTime<Local>,
}

impl Session {
    pub fn new(identity: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            identity: identity.into(),
            started_at: now,
            last_activity: now,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn last_activity(&self) -> DateTime<Local> {
        self.last_activity
    }

    /// Update last activity time
    pub fn touch(&mut self, now: DateTime<Local>) {
        self.last_activity = now;
    }

    /// Time since the session started
    pub fn age(&self, now: DateTime<Local>) -> Duration {
        now - self.started_at
    }
}

/// Persisted "current identity" value
#[derive(Clone)]
pub struct SessionMarker {
    store: Arc<dyn SecretStore>,
}

impl SessionMarker {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Identity of the active session, if any; unreadable reads as none
    pub async fn get(&self) -> Option<String> {
        match self.store.get(CURRENT_USER_KEY).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("Failed to read session marker: {}", e);
                None
            }
        }
    }

    pub async fn set(&self, identity: &str) {
        if let Err(e) = self.store.set(CURRENT_USER_KEY, identity).await {
            warn!("Failed to write session marker: {}", e);
        }
    }

    /// Remove the marker; clearing an absent marker is fine
    pub async fn clear(&self) {
        if let Err(e) = self.store.delete(CURRENT_USER_KEY).await {
            warn!("Failed to clear session marker: {}", e);
        }
    }
}
