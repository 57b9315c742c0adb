//! Runtime configuration resolved from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `CODEPOD_DB_PATH` | SQLite database file | `<temp dir>/codepod.sqlite3` |
//! | `CODEPOD_LOG_LEVEL` | `trace\|debug\|info\|warn\|error` | `default_log_level()` |
//! | `CODEPOD_LOG_DIR` | absolute log directory | unset: file logging disabled |
//!
//! Blank values are treated as unset.

use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "CODEPOD_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "CODEPOD_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CODEPOD_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "codepod.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its raw value.
    ///
    /// # Errors
    /// - `LoggingError::UnsupportedLevel` for an unknown `CODEPOD_LOG_LEVEL`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_level = match read(LOG_LEVEL_VAR) {
            Some(raw) => LogLevel::parse(&raw)?,
            None => default_log_level(),
        };
        let log_dir = read(LOG_DIR_VAR).map(PathBuf::from);

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
