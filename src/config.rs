//! Configuration loading and management
//!
//! Handles parsing of `.tracker.toml` configuration files.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::persist::StoreOptions;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = ".tracker.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data file configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// View history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Defaults for new tasks and subtasks
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data file, relative to the directory holding the config
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// How long to wait for the data file lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_path() -> PathBuf {
    PathBuf::from("data").join("tasks.csv")
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// View history configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Most entities remembered; unset keeps every viewed entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Defaults for new tasks and subtasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,
}

fn default_duration_minutes() -> i64 {
    60
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

impl TasksConfig {
    pub fn default_duration(&self) -> Result<Duration> {
        Duration::try_minutes(self.default_duration_minutes).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "tasks.default_duration_minutes out of range: {}",
                self.default_duration_minutes
            ))
        })
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.tracker.toml` from `dir`, or return defaults
    ///
    /// An unreadable or invalid file is ignored with a warning.
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %config_path.display(), error = %err, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data file location, resolved against the config directory
    pub fn data_file(&self, dir: &Path) -> PathBuf {
        if self.storage.path.is_absolute() {
            self.storage.path.clone()
        } else {
            dir.join(&self.storage.path)
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            lock_timeout_ms: self.storage.lock_timeout_ms,
            history_limit: self.history.limit.and_then(NonZeroUsize::new),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storage.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "storage.path cannot be empty".to_string(),
            ));
        }
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.history.limit == Some(0) {
            return Err(Error::InvalidConfig(
                "history.limit must be > 0".to_string(),
            ));
        }
        if self.tasks.default_duration_minutes < 0 {
            return Err(Error::InvalidConfig(
                "tasks.default_duration_minutes must be >= 0".to_string(),
            ));
        }
        self.tasks.default_duration()?;
        Ok(())
    }
}
