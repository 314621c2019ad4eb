//! Streakgate - login guard and engagement scoring for a local account
//!
//! This crate provides:
//! - Password login with per-identity attempt counting and a fixed lockout window
//! - Biometric login through a pluggable hardware probe
//! - A persisted session marker and an explicit in-process session handle
//! - Daily login streaks, points, badges, ranks and milestones
//! - A capped engagement notification feed
//!
//! Persistence goes through two key/value collaborators: a confidential
//! [`SecretStore`] and a general [`RecordStore`].

pub mod auth;
pub mod biometric;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod draft;
pub mod error;
pub mod identity;
pub mod notifications;
pub mod scoring;
pub mod store;
pub mod user;
pub mod users;
pub mod validation;

pub use auth::{AttemptTracker, Lockout, LockoutPolicy, LoginGuard, Session, SessionMarker};
pub use biometric::{BiometricProbe, FixedProbe, NoBiometrics};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GuardConfig;
pub use credentials::{CredentialStore, Credentials};
pub use draft::{RegistrationDraft, RegistrationDraftStore};
pub use error::{GuardError, Result, StoreError};
pub use notifications::{Notification, NotificationCategory, NotificationFeed};
pub use store::{FileStore, MemoryStore, RecordStore, SecretStore};
pub use user::{Badges, Profile, User};
pub use users::UserRepository;
pub use validation::{validate_login, validate_registration, LoginForm, RegistrationForm, ValidationError};
