//! Identity key normalization
//!
//! An identity (email) has two storage forms that are NOT interchangeable:
//!
//! - the record key: the identity unchanged, used for user records
//! - the secret key: every character outside `[A-Za-z0-9]` replaced by `_`,
//!   used for credentials, attempt counters and lockout timestamps

/// Key used to look up user records
pub fn record_key(identity: &str) -> &str {
    identity
}

/// Key fragment used for every confidential-store entry of an identity
///
/// Idempotent: `secret_key(&secret_key(x)) == secret_key(x)`.
pub fn secret_key(identity: &str) -> String {
    identity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
