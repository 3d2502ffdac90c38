//! Server configuration.

use crate::ai::Difficulty;
use crate::room::RoomSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Server settings, loaded from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// SQLite database path. Without one, matches live in memory only.
    #[setters(strip_option)]
    database: Option<String>,

    /// Seconds a room with no connected sessions stays live.
    room_idle_timeout_secs: u64,

    /// AI strength for matches that do not name one.
    ai_difficulty: Difficulty,

    /// Events queued per session before new ones are dropped.
    subscriber_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database: None,
            room_idle_timeout_secs: 600,
            ai_difficulty: Difficulty::Medium,
            subscriber_buffer: 64,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(host = %config.host, port = config.port, "Config loaded");
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subscriber_buffer == 0 {
            return Err(ConfigError::new("subscriber_buffer must be at least 1"));
        }
        if self.room_idle_timeout_secs == 0 {
            return Err(ConfigError::new("room_idle_timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Room settings derived from this configuration.
    pub fn room_settings(&self) -> RoomSettings {
        RoomSettings {
            idle_timeout: Duration::from_secs(self.room_idle_timeout_secs),
            default_difficulty: self.ai_difficulty,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a configuration error recording the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\nai_difficulty = \"hard\"").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(*config.ai_difficulty(), Difficulty::Hard);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.database(), &None);
    }

    #[test]
    fn test_rejects_zero_buffer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "subscriber_buffer = 0").unwrap();
        assert!(ServerConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_builders() {
        let config = ServerConfig::default()
            .with_port(4000)
            .with_database("games.db".to_string());
        assert_eq!(*config.port(), 4000);
        assert_eq!(config.database().as_deref(), Some("games.db"));
        assert_eq!(config.room_settings().idle_timeout, Duration::from_secs(600));
    }
}
