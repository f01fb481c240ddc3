//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::interpreter;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "VOICE_SHOPPING_DATA_DIR";
/// Environment variable selecting the initial recognition locale
pub const LOCALE_ENV: &str = "VOICE_SHOPPING_LOCALE";
/// Environment variable overriding the confidence floor
pub const CONFIDENCE_FLOOR_ENV: &str = "VOICE_SHOPPING_CONFIDENCE_FLOOR";

/// Invalid configuration values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HOME is not set and {DATA_DIR_ENV} was not given")]
    NoHome,

    #[error("unsupported locale {0:?}")]
    UnsupportedLocale(String),

    #[error("confidence floor must be a number between 0 and 1, got {0:?}")]
    InvalidConfidence(String),
}

/// Delays driving the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Restart delay after a transient recognizer error
    pub retry_delay: Duration,
    /// Restart delay after a network error
    pub network_recovery_delay: Duration,
    /// Restart delay after a session ends while listening is wanted
    pub restart_delay: Duration,
    /// Stop when no terminal event arrives within this window
    pub inactivity_timeout: Duration,
    pub manual_retry_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(3),
            network_recovery_delay: Duration::from_secs(2),
            restart_delay: Duration::from_secs(1),
            inactivity_timeout: Duration::from_secs(10),
            manual_retry_delay: Duration::from_secs(1),
        }
    }
}

/// Session controller settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub timings: SessionTimings,
    /// Unrecognized results below this confidence are discarded
    pub confidence_floor: f32,
    /// Recognized results at or below this confidence log a warning
    pub confidence_warning: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timings: SessionTimings::default(),
            confidence_floor: 0.05,
            confidence_warning: 0.1,
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Saved shopping list
    pub list_path: PathBuf,

    /// Initial recognition locale
    pub locale: String,

    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok()).context("invalid configuration")
    }

    /// Build configuration from an environment lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match lookup(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME").ok_or(ConfigError::NoHome)?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("voice-shopping")
            }
        };

        let locale = match lookup(LOCALE_ENV) {
            Some(code) => interpreter::locale(&code)
                .map(|info| info.code.to_string())
                .ok_or(ConfigError::UnsupportedLocale(code))?,
            None => interpreter::DEFAULT_LOCALE.to_string(),
        };

        let mut session = SessionConfig::default();
        if let Some(raw) = lookup(CONFIDENCE_FLOOR_ENV) {
            session.confidence_floor = raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|floor| (0.0..=1.0).contains(floor))
                .ok_or(ConfigError::InvalidConfidence(raw))?;
        }

        Ok(Self {
            socket_path: data_dir.join("daemon.sock"),
            list_path: data_dir.join("shopping-list.json"),
            data_dir,
            locale,
            session,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}
