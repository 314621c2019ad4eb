//! Biometric hardware abstraction
//!
//! The guard never talks to a fingerprint reader or face sensor directly.
//! Platforms plug in a [`BiometricProbe`]; the guard only asks whether one
//! is usable and whether a prompt succeeded.

use async_trait::async_trait;

/// Prompt shown by the platform when a biometric login starts
pub const BIOMETRIC_PROMPT: &str = "Login with biometric authentication";

/// Result of a biometric prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
}

/// Platform biometric capability
#[async_trait]
pub trait BiometricProbe: Send + Sync {
    /// Whether the device has biometric hardware
    async fn has_hardware(&self) -> bool;

    /// Whether at least one biometric is enrolled
    async fn is_enrolled(&self) -> bool;

    /// Run the platform prompt
    async fn authenticate(&self, prompt: &str) -> AuthOutcome;

    /// Hardware present and enrolled
    async fn is_available(&self) -> bool {
        self.has_hardware().await && self.is_enrolled().await
    }

    /// Get the device type name
    fn device_type(&self) -> &'static str;
}

/// Probe for hosts without biometric hardware (terminals, servers)
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBiometrics;

#[async_trait]
impl BiometricProbe for NoBiometrics {
    async fn has_hardware(&self) -> bool {
        false
    }

    async fn is_enrolled(&self) -> bool {
        false
    }

    async fn authenticate(&self, _prompt: &str) -> AuthOutcome {
        AuthOutcome { success: false }
    }

    fn device_type(&self) -> &'static str {
        "none"
    }
}

/// Probe with fixed answers, for tests and demos
#[derive(Clone, Copy, Debug)]
pub struct FixedProbe {
    pub has_hardware: bool,
    pub enrolled: bool,
    pub succeeds: bool,
}

impl FixedProbe {
    /// Hardware present, enrolled, prompt succeeds
    pub fn accepting() -> Self {
        Self {
            has_hardware: true,
            enrolled: true,
            succeeds: true,
        }
    }

    /// Hardware present, enrolled, prompt fails
    pub fn rejecting() -> Self {
        Self {
            succeeds: false,
            ..Self::accepting()
        }
    }

    /// Hardware present but nothing enrolled
    pub fn unenrolled() -> Self {
        Self {
            enrolled: false,
            ..Self::accepting()
        }
    }
}

#[async_trait]
impl BiometricProbe for FixedProbe {
    async fn has_hardware(&self) -> bool {
        self.has_hardware
    }

    async fn is_enrolled(&self) -> bool {
        self.enrolled
    }

    async fn authenticate(&self, _prompt: &str) -> AuthOutcome {
        AuthOutcome {
            success: self.succeeds,
        }
    }

    fn device_type(&self) -> &'static str {
        "fixed"
    }
}
