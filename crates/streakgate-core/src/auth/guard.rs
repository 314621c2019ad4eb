//! Login orchestration
//!
//! Order of a password login:
//!
//! 1. lockout check on the sanitized identity
//! 2. credential check (unknown identity and wrong secret look the same)
//! 3. attempt reset, login scoring and session write

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{AttemptTracker, Lockout, LockoutPolicy, Session, SessionMarker};
use crate::biometric::{BiometricProbe, BIOMETRIC_PROMPT};
use crate::clock::Clock;
use crate::config::GuardConfig;
use crate::credentials::CredentialStore;
use crate::error::{GuardError, Result};
use crate::identity::secret_key;
use crate::scoring;
use crate::store::{FileStore, RecordStore, SecretStore, BIOMETRIC_ENABLED_KEY};
use crate::user::User;
use crate::users::UserRepository;
use crate::validation::{validate_registration, RegistrationForm};

/// Login guard for one process
pub struct LoginGuard {
    credentials: CredentialStore,
    users: UserRepository,
    lockout: Lockout,
    marker: SessionMarker,
    records: Arc<dyn RecordStore>,
    biometrics: Arc<dyn BiometricProbe>,
    clock: Arc<dyn Clock>,
    session: Mutex<Option<Session>>,
}

impl LoginGuard {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        records: Arc<dyn RecordStore>,
        policy: LockoutPolicy,
        biometrics: Arc<dyn BiometricProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tracker = AttemptTracker::new(secrets.clone());
        Self {
            credentials: CredentialStore::new(secrets.clone()),
            users: UserRepository::new(records.clone()),
            lockout: Lockout::new(policy, tracker, clock.clone()),
            marker: SessionMarker::new(secrets),
            records,
            biometrics,
            clock,
            session: Mutex::new(None),
        }
    }

    /// Guard over file-backed stores in `config.data_dir`
    pub fn from_config(
        config: &GuardConfig,
        biometrics: Arc<dyn BiometricProbe>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.ensure_directories()?;

        let secrets = FileStore::new(config.secrets_path())
            .map_err(|e| GuardError::Config(format!("secrets store: {}", e)))?;
        let records = FileStore::new(config.records_path())
            .map_err(|e| GuardError::Config(format!("records store: {}", e)))?;

        Ok(Self::new(
            Arc::new(secrets),
            Arc::new(records),
            config.lockout_policy(),
            biometrics,
            clock,
        ))
    }

    pub fn policy(&self) -> &LockoutPolicy {
        self.lockout.policy()
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    fn session_slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn open_session(&self, identity: &str) {
        self.marker.set(identity).await;
        *self.session_slot() = Some(Session::new(identity, self.clock.now()));
    }

    /// Password login
    ///
    /// Returns `Ok(None)` when the credentials match but no user record
    /// exists for the identity.
    pub async fn login(&self, identity: &str, secret: &str) -> Result<Option<User>> {
        let id = secret_key(identity);

        if self.lockout.is_locked(&id).await {
            let retry_after_secs = self
                .lockout
                .lockout_remaining(&id)
                .await
                .map(ceil_secs)
                .unwrap_or(0);
            warn!("Login refused for {}: locked for {}s", id, retry_after_secs);
            return Err(GuardError::AccountLocked { retry_after_secs });
        }

        let matched = self
            .credentials
            .get(identity)
            .await
            .is_some_and(|stored| stored.matches(secret));

        if !matched {
            let count = self.lockout.tracker().increment(&id).await;
            warn!("Failed login for {} ({} consecutive)", id, count);
            if self.lockout.policy().reaches_threshold(count) {
                self.lockout.arm(&id).await;
            }
            return Err(GuardError::InvalidCredentials);
        }

        self.lockout.tracker().reset(&id).await;

        let user = match self.users.get(identity).await {
            Some(mut user) => {
                let reward = scoring::apply_login(&mut user, self.clock.now());
                debug!(
                    "Scored login for {}: {:?}, +{} points, badges {:?}",
                    id, reward.streak_change, reward.daily_points, reward.new_badges
                );
                self.users.save(&user).await?;
                Some(user)
            }
            None => {
                debug!("No user record for {}", id);
                None
            }
        };

        self.open_session(identity).await;

        if let Err(e) = self.records.set(BIOMETRIC_ENABLED_KEY, "true").await {
            warn!("Failed to store biometric preference: {}", e);
        }

        info!("Login succeeded for {}", id);
        Ok(user)
    }

    /// Store credentials and profile, then log the new identity in
    ///
    /// Registering an existing identity silently overwrites it.
    pub async fn register(&self, user: &User, secret: &str) -> Result<()> {
        self.credentials.save(&user.email, secret).await?;
        self.users.save(user).await?;
        self.open_session(&user.email).await;

        info!("Registered {}", secret_key(&user.email));
        Ok(())
    }

    /// Validate a registration form, seed the user record and register it
    pub async fn register_form(&self, form: &RegistrationForm) -> Result<User> {
        validate_registration(form)?;

        let user = User::new_registration(form.profile(), self.clock.now());
        self.register(&user, &form.password).await?;
        Ok(user)
    }

    /// Biometric login
    ///
    /// Resolves the session identity's record, else falls back to the first
    /// stored record and makes it the session identity.
    pub async fn biometric_login(&self) -> Result<User> {
        if !self.biometrics.is_available().await {
            debug!(
                "Biometric login unavailable on {} device",
                self.biometrics.device_type()
            );
            return Err(GuardError::BiometricUnavailable);
        }

        if !self.biometrics.authenticate(BIOMETRIC_PROMPT).await.success {
            warn!("Biometric authentication failed");
            return Err(GuardError::BiometricFailed);
        }

        if let Some(identity) = self.marker.get().await {
            if let Some(user) = self.users.get(&identity).await {
                *self.session_slot() = Some(Session::new(identity, self.clock.now()));
                info!("Biometric login for {}", secret_key(&user.email));
                return Ok(user);
            }
            debug!("Session identity has no user record, using first record");
        }

        let Some(user) = self.users.first().await else {
            return Err(GuardError::NoAccountFound);
        };

        self.open_session(&user.email).await;
        info!("Biometric login for {} (first record)", secret_key(&user.email));
        Ok(user)
    }

    /// End the session; logging out twice is fine
    pub async fn logout(&self) {
        self.marker.clear().await;
        if let Some(session) = self.session_slot().take() {
            info!("Logged out {}", secret_key(session.identity()));
        }
    }

    pub async fn is_logged_in(&self) -> bool {
        self.marker.get().await.is_some()
    }

    /// User record of the session identity
    pub async fn current_user(&self) -> Option<User> {
        let identity = self.marker.get().await?;
        let user = self.users.get(&identity).await;

        if user.is_some() {
            if let Some(session) = self.session_slot().as_mut() {
                session.touch(self.clock.now());
            }
        }
        user
    }

    /// Rebuild the session handle from the persisted marker
    pub async fn resume(&self) -> Option<Session> {
        let identity = self.marker.get().await?;
        let session = Session::new(identity, self.clock.now());
        *self.session_slot() = Some(session.clone());
        Some(session)
    }

    /// In-process session handle, if any
    pub fn session(&self) -> Option<Session> {
        self.session_slot().clone()
    }

    /// Attempts left before lockout, 0 while locked
    ///
    /// Never clears an expired window; see [`LoginGuard::reset_attempts`].
    pub async fn remaining_attempts(&self, identity: &str) -> u32 {
        self.lockout.remaining_attempts(&secret_key(identity)).await
    }

    /// Whole seconds left in an open lockout window
    pub async fn lockout_remaining(&self, identity: &str) -> Option<u64> {
        self.lockout
            .lockout_remaining(&secret_key(identity))
            .await
            .map(ceil_secs)
    }

    /// Clear the failure count and lockout deadline
    pub async fn reset_attempts(&self, identity: &str) {
        let id = secret_key(identity);
        self.lockout.tracker().reset(&id).await;
        debug!("Reset attempts for {}", id);
    }

    /// Whether a password login has enabled biometric login
    pub async fn biometric_enabled(&self) -> bool {
        match self.records.get(BIOMETRIC_ENABLED_KEY).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!("Failed to read biometric preference: {}", e);
                false
            }
        }
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
