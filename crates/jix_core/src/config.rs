//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! db_path = "/var/lib/jix/jix.sqlite3"
//! log_level = "info"        # optional
//! log_dir = "/var/log/jix"  # optional, absolute; omit to disable file logs
//! ```

use crate::logging::{default_log_level, normalize_level, LoggingError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Configuration with only a database path; file logging stays off.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_level: None,
            log_dir: None,
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        // Fail on a bad level at load time, not at first log init.
        config.effective_log_level()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn effective_log_level(&self) -> Result<&'static str, LoggingError> {
        match self.log_level.as_deref() {
            Some(level) => normalize_level(level),
            None => Ok(default_log_level()),
        }
    }

    /// Starts file logging when `log_dir` is set. Returns whether it did.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        crate::logging::init_logging(self.effective_log_level()?, dir)?;
        Ok(true)
    }
}
