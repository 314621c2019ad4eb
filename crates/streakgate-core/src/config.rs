//! Guard configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{LockoutPolicy, LOCKOUT_DURATION, MAX_ATTEMPTS};
use crate::error::{GuardError, Result};
use crate::notifications::DEFAULT_CAPACITY;

/// Confidential store file name inside `data_dir`
pub const SECRETS_FILE: &str = "secrets.json";
/// General store file name inside `data_dir`
pub const RECORDS_FILE: &str = "records.json";
/// Config file name inside `data_dir`
pub const CONFIG_FILE: &str = "config.json";

/// Guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Failed logins before the account locks
    pub max_attempts: u32,

    /// Lockout window (seconds)
    pub lockout_duration_secs: u64,

    /// Notifications kept in the feed
    pub notification_capacity: usize,

    /// Directory holding the store files
    pub data_dir: PathBuf,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            lockout_duration_secs: LOCKOUT_DURATION.as_secs(),
            notification_capacity: DEFAULT_CAPACITY,
            data_dir: Self::default_data_dir(),
        }
    }
}

impl GuardConfig {
    fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("streakgate")
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GuardError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| GuardError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the lockout policy cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(GuardError::Config("max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load from file if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| GuardError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| GuardError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Create directories if they don't exist
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| GuardError::Config(format!("{}: {}", self.data_dir.display(), e)))
    }

    /// Lockout policy; `max_attempts` is at least 1
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(
            self.max_attempts.max(1),
            Duration::from_secs(self.lockout_duration_secs),
        )
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.data_dir.join(SECRETS_FILE)
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.lockout_duration_secs, 30);
        assert_eq!(config.notification_capacity, 10);
        assert!(config.data_dir.ends_with("streakgate"));
        assert_eq!(config.lockout_policy(), LockoutPolicy::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = GuardConfig {
            max_attempts: 3,
            lockout_duration_secs: 120,
            notification_capacity: 4,
            data_dir: dir.path().join("data"),
        };
        config.save(&path).unwrap();

        let loaded = GuardConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.lockout_policy().lockout_duration, Duration::from_secs(120));

        loaded.ensure_directories().unwrap();
        assert!(loaded.data_dir.is_dir());
        assert_eq!(loaded.secrets_path(), dir.path().join("data").join(SECRETS_FILE));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_attempts": 8}"#).unwrap();

        let loaded = GuardConfig::load(&path).unwrap();
        assert_eq!(loaded.max_attempts, 8);
        assert_eq!(loaded.lockout_duration_secs, 30);
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(GuardConfig::load(&missing), Err(GuardError::Config(_))));
        assert_eq!(
            GuardConfig::load_or_default(&missing).unwrap(),
            GuardConfig::default()
        );

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "max_attempts = 3").unwrap();
        assert!(matches!(GuardConfig::load(&bad), Err(GuardError::Config(_))));
    }

    #[test]
    fn test_zero_max_attempts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_attempts": 0}"#).unwrap();
        assert!(matches!(GuardConfig::load(&path), Err(GuardError::Config(_))));

        let config = GuardConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let policy = config.lockout_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.attempts_left(0), 1);
        assert!(!policy.reaches_threshold(0));
    }
}
