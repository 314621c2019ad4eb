//! Error types for the login guard and its storage collaborators

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias for guard operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors surfaced to callers of the login guard
///
/// Callers branch on the variant, never on the message text.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Lockout window is active for this identity
    #[error("Account locked due to too many failed attempts (retry in {retry_after_secs} seconds)")]
    AccountLocked { retry_after_secs: u64 },

    /// Unknown identity or wrong secret
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No biometric hardware, or nothing enrolled
    #[error("Biometric authentication not available or enrolled")]
    BiometricUnavailable,

    /// Biometric prompt reported failure
    #[error("Biometric authentication failed")]
    BiometricFailed,

    /// Biometric succeeded but no stored account could be resolved
    #[error("No user account found for biometric login")]
    NoAccountFound,

    /// Credential or profile persistence failed
    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    /// Inbound field failed its format contract
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded or saved
    #[error("Config error: {0}")]
    Config(String),
}

/// Errors returned by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend refused or could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
