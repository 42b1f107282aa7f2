/// Configuration file support
///
/// Settings come from an optional `config.toml` in the platform config
/// directory. Command line flags override anything set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analytics::DEFAULT_RATE_WINDOW_DAYS;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Planner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Owner of every record this server reads and writes
    pub user_id: String,
    /// SQLite database file; the default location is used when unset
    pub database: Option<PathBuf>,
    /// Length of the completion-rate window, ending today
    pub completion_rate_window_days: u32,
    /// Default number of dates listed by recurrence previews and upcoming tasks
    pub upcoming_count: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            database: None,
            completion_rate_window_days: DEFAULT_RATE_WINDOW_DAYS,
            upcoming_count: 7,
        }
    }
}

impl PlannerConfig {
    /// Load from `path`, or from the default location when `path` is `None`
    ///
    /// A missing file at the default location is not an error; an explicit
    /// path that can't be read is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(default) if default.exists() => Self::load_from(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("saturn-planner").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::Invalid("user_id cannot be empty".to_string()));
        }
        if self.completion_rate_window_days == 0 {
            return Err(ConfigError::Invalid(
                "completion_rate_window_days must be at least 1".to_string(),
            ));
        }
        if self.upcoming_count == 0 {
            return Err(ConfigError::Invalid("upcoming_count must be at least 1".to_string()));
        }
        Ok(())
    }
}
