//! Lockout after repeated login failures
//!
//! - Fewer than `max_attempts` failures: never locked
//! - The failure that reaches `max_attempts` arms a single lockout window
//! - While the window is open every login is refused, even with the right
//!   secret
//! - The first `is_locked` check after the window closes resets the counter
//!
//! `remaining_attempts` never resets anything. A caller that shows a
//! countdown from it must call [`AttemptTracker::reset`] itself when the
//! countdown reaches zero, or it will keep reading 0.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::AttemptTracker;
use crate::clock::Clock;

/// Failures allowed before the account locks
pub const MAX_ATTEMPTS: u32 = 5;
/// Length of the lockout window
pub const LOCKOUT_DURATION: Duration = Duration::from_secs(30);

/// Lockout thresholds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures before the account locks
    pub max_attempts: u32,
    /// How long the account stays locked
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            lockout_duration: LOCKOUT_DURATION,
        }
    }
}

impl LockoutPolicy {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            max_attempts,
            lockout_duration,
        }
    }

    /// Whether this many failures is enough to lock
    pub fn reaches_threshold(&self, failed_attempts: u32) -> bool {
        failed_attempts >= self.max_attempts
    }

    /// Attempts left before the threshold
    pub fn attempts_left(&self, failed_attempts: u32) -> u32 {
        self.max_attempts.saturating_sub(failed_attempts)
    }

    /// Human-readable lockout state
    pub fn describe_lockout(&self, failed_attempts: u32, locked_for: Option<Duration>) -> String {
        match locked_for {
            Some(duration) => {
                let secs = duration.as_secs().max(1);
                if secs < 60 {
                    format!("Locked for {} seconds", secs)
                } else {
                    format!("Locked for {} minutes", secs.div_ceil(60))
                }
            }
            None => format!("{} attempts remaining", self.attempts_left(failed_attempts)),
        }
    }
}

/// Lockout decisions over persisted attempt state
#[derive(Clone)]
pub struct Lockout {
    policy: LockoutPolicy,
    tracker: AttemptTracker,
    clock: Arc<dyn Clock>,
}

impl Lockout {
    pub fn new(policy: LockoutPolicy, tracker: AttemptTracker, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            tracker,
            clock,
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    pub fn tracker(&self) -> &AttemptTracker {
        &self.tracker
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Open the lockout window for `id`
    pub async fn arm(&self, id: &str) {
        let window = i64::try_from(self.policy.lockout_duration.as_millis()).unwrap_or(i64::MAX);
        let until = self.now_millis().saturating_add(window);
        self.tracker.set_lockout_until(id, until).await;
        info!(
            "Locking {} for {} seconds after {} failed attempts",
            id,
            self.policy.lockout_duration.as_secs(),
            self.policy.max_attempts
        );
    }

    /// Whether `id` is inside an open lockout window
    ///
    /// An expired window is cleared here, together with the failure count.
    pub async fn is_locked(&self, id: &str) -> bool {
        let failed = self.tracker.failed_count(id).await;
        if !self.policy.reaches_threshold(failed) {
            return false;
        }

        let Some(until) = self.tracker.lockout_until(id).await else {
            return false;
        };

        if self.now_millis() > until {
            debug!("Lockout for {} expired, resetting attempts", id);
            self.tracker.reset(id).await;
            return false;
        }

        true
    }

    /// Attempts left before lockout, 0 while locked
    ///
    /// Does not clear an expired window.
    pub async fn remaining_attempts(&self, id: &str) -> u32 {
        let failed = self.tracker.failed_count(id).await;
        let until = self.tracker.lockout_until(id).await;

        if let Some(until) = until {
            if until > self.now_millis() && self.policy.reaches_threshold(failed) {
                return 0;
            }
        }

        self.policy.attempts_left(failed)
    }

    /// Time left in an open lockout window
    pub async fn lockout_remaining(&self, id: &str) -> Option<Duration> {
        let failed = self.tracker.failed_count(id).await;
        if !self.policy.reaches_threshold(failed) {
            return None;
        }

        let until = self.tracker.lockout_until(id).await?;
        let left = until - self.now_millis();
        (left > 0).then(|| Duration::from_millis(left as u64))
    }
}
