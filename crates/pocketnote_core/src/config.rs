//! Runtime configuration for embedders.
//!
//! # Responsibility
//! - Resolve the database location and logging settings.
//! - Bootstrap logging and the note database from one config value.
//!
//! # Invariants
//! - Blank environment values are ignored, never treated as paths.
//! - `bootstrap` starts logging before the database is opened, so
//!   `db_open` events reach the log file.

use crate::db::{open_db, DbError};
use crate::logging::{init_logging, LogLevel, LoggingError};
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "POCKETNOTE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "POCKETNOTE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "POCKETNOTE_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "pocketnote.sqlite3";

/// Configuration error raised by `bootstrap`.
#[derive(Debug)]
pub enum ConfigError {
    Logging(LoggingError),
    Db(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "logging setup failed: {err}"),
            Self::Db(err) => write!(f, "note database open failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Core settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Database file; `None` means `<temp dir>/pocketnote.sqlite3`.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Log directory; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: LogLevel::build_default().as_str().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `POCKETNOTE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, skipping unset or blank values.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = non_blank(DB_PATH_ENV) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        if let Some(dir) = non_blank(LOG_DIR_ENV) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Effective database path.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
    }
}

/// Starts logging (when configured) and opens the note database.
pub fn bootstrap(config: &CoreConfig) -> Result<Connection, ConfigError> {
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, log_dir)?;
    }
    Ok(open_db(config.resolved_db_path())?)
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::path::PathBuf;

    #[test]
    fn overrides_skip_blank_values() {
        let config = CoreConfig::default().with_overrides(|key| match key {
            DB_PATH_ENV => Some("  /data/notes.db ".to_string()),
            LOG_LEVEL_ENV => Some("   ".to_string()),
            LOG_DIR_ENV => None,
            _ => None,
        });

        assert_eq!(config.db_path, Some(PathBuf::from("/data/notes.db")));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn default_db_path_lives_in_temp_dir() {
        let path = CoreConfig::default().resolved_db_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("pocketnote.sqlite3"));
    }
}
