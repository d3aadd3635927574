//! Engine configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::{str::FromStr, time::Duration};

use crate::game::{MAX_PLAYERS, MIN_PLAYERS};

/// Runtime settings of the game service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest game the service will create (capped by [`MAX_PLAYERS`])
    pub max_players: usize,

    /// How long a mutating call waits for the per-game lock
    pub lock_timeout_ms: u64,

    /// How many times an operation is replayed after a version conflict
    pub max_save_retries: u32,

    /// Buffered events per subscriber before notifications are dropped
    pub notification_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            lock_timeout_ms: 500,
            max_save_retries: 3,
            notification_capacity: 64,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Recognised variables (all optional):
    /// - `HOLDEM_MAX_PLAYERS` (default: 10)
    /// - `HOLDEM_LOCK_TIMEOUT_MS` (default: 500)
    /// - `HOLDEM_MAX_SAVE_RETRIES` (default: 3)
    /// - `HOLDEM_NOTIFICATION_CAPACITY` (default: 64)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but unparsable, or the result fails
    /// [`EngineConfig::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_players: parse_env_or("HOLDEM_MAX_PLAYERS", defaults.max_players)?,
            lock_timeout_ms: parse_env_or("HOLDEM_LOCK_TIMEOUT_MS", defaults.lock_timeout_ms)?,
            max_save_retries: parse_env_or("HOLDEM_MAX_SAVE_RETRIES", defaults.max_save_retries)?,
            notification_capacity: parse_env_or(
                "HOLDEM_NOTIFICATION_CAPACITY",
                defaults.notification_capacity,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(ConfigError::Invalid {
                var: "HOLDEM_MAX_PLAYERS".to_string(),
                reason: format!("Must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            });
        }

        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "HOLDEM_LOCK_TIMEOUT_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "HOLDEM_NOTIFICATION_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, falling back to `default` when unset
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the variable is set but does not parse
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse {value:?}"),
        }),
        Err(_) => Ok(default),
    }
}
