//! Runtime configuration for hosts embedding the journal core.
//!
//! # Invariants
//! - Every setting has a default; a missing variable is never an error.
//! - File logging is enabled only when a log directory is configured.

use crate::logging::{default_log_level, init_logging};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "NBA_JOURNAL_DB";
pub const LOG_LEVEL_VAR: &str = "NBA_JOURNAL_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "NBA_JOURNAL_LOG_DIR";

pub const DEFAULT_DB_FILE_NAME: &str = "nba_journal.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl JournalConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            db_path: read(DB_PATH_VAR).map_or(defaults.db_path, PathBuf::from),
            log_level: read(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging stays disabled.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: `{}`", log_dir.display()))?;
        init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{JournalConfig, DB_PATH_VAR, DEFAULT_DB_FILE_NAME, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_variables_fall_back_to_defaults() {
        let config = JournalConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, JournalConfig::default());
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn variables_override_defaults_and_blank_is_unset() {
        let config = JournalConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/journal.sqlite3"),
            (LOG_LEVEL_VAR, "warn"),
            (LOG_DIR_VAR, "  "),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/journal.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn logging_stays_disabled_without_directory() {
        let config = JournalConfig::default();
        assert_eq!(config.init_logging(), Ok(false));
    }
}
