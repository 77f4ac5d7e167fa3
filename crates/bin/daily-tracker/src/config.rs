//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `daily-tracker.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;

use chrono::TimeDelta;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Journal file to import.
    pub journal: JournalConfig,
    /// Event bus settings.
    pub events: EventsConfig,
    /// Lookup cache settings.
    pub cache: CacheConfig,
    /// Store snapshots.
    pub backup: BackupConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Path of the TOML journal.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity; slow subscribers lag past it.
    pub capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long looked-up entries stay cached. `0` disables caching.
    pub ttl_secs: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory holding `tasks.json` and `sleep.json`. Unset disables backups.
    pub dir: Option<PathBuf>,
}

impl BackupConfig {
    #[must_use]
    pub fn tasks_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join("tasks.json"))
    }

    #[must_use]
    pub fn sleep_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join("sleep.json"))
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `daily-tracker.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("daily-tracker.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DAILY_TRACKER_JOURNAL") {
            self.journal.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("DAILY_TRACKER_EVENT_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                self.events.capacity = capacity;
            }
        }
        if let Ok(val) = std::env::var("DAILY_TRACKER_CACHE_TTL") {
            if let Ok(ttl) = val.parse() {
                self.cache.ttl_secs = ttl;
            }
        }
        if let Ok(val) = std::env::var("DAILY_TRACKER_BACKUP_DIR") {
            self.backup.dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("DAILY_TRACKER_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.events.capacity == 0 {
            return Err(ConfigError::Validation(
                "event capacity must be non-zero".to_string(),
            ));
        }
        if self.journal.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "journal path must not be empty".to_string(),
            ));
        }
        if self
            .backup
            .dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            return Err(ConfigError::Validation(
                "backup dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache lifetime of looked-up entries.
    #[must_use]
    pub fn cache_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.cache.ttl_secs))
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("journal.toml"),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "daily_tracker=info,daily_tracker_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.journal.path, PathBuf::from("journal.toml"));
        assert_eq!(config.events.capacity, 256);
        assert_eq!(config.cache.ttl_secs, 300);
        assert!(config.logging.filter.contains("daily_tracker=info"));
        assert!(config.backup.dir.is_none());
        assert!(config.backup.sleep_path().is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.events.capacity, 256);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [journal]
            path = '/var/lib/tracker/march.toml'

            [events]
            capacity = 32

            [cache]
            ttl_secs = 0

            [backup]
            dir = '/var/lib/tracker/backup'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.journal.path,
            PathBuf::from("/var/lib/tracker/march.toml")
        );
        assert_eq!(config.events.capacity, 32);
        assert_eq!(config.cache.ttl_secs, 0);
        assert_eq!(
            config.backup.tasks_path(),
            Some(PathBuf::from("/var/lib/tracker/backup/tasks.json"))
        );
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [events]
            capacity = 8
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.events.capacity, 8);
        assert_eq!(config.journal.path, PathBuf::from("journal.toml"));
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.events.capacity, 256);
    }

    #[test]
    fn should_reject_zero_capacity() {
        let mut config = Config::default();
        config.events.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_empty_journal_path() {
        let mut config = Config::default();
        config.journal.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_backup_dir() {
        let mut config = Config::default();
        config.backup.dir = Some(PathBuf::new());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_express_ttl_as_time_delta() {
        let mut config = Config::default();
        assert_eq!(config.cache_ttl(), TimeDelta::minutes(5));
        config.cache.ttl_secs = 0;
        assert_eq!(config.cache_ttl(), TimeDelta::zero());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
