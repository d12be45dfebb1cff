//! # Runtime Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! [history]
//! capacity = 200
//!
//! [schedule.families.frame]
//! tags = ["editor"]
//!
//! [schedule.families.fixed]
//! tags = ["playing"]
//! order = ["input", "physics"]
//! ```
//!
//! Every section is optional; missing values take their defaults.

use std::io;
use std::path::{Path, PathBuf};

use mosaic_history::HistoryConfig;
use mosaic_schedule::ScheduleManifest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`RuntimeConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The config text is not valid.
    #[error("invalid runtime config: {0}")]
    Parse(String),
}

/// Startup configuration of a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Undo ring settings.
    pub history: HistoryConfig,
    /// Families to schedule, with their tags and optional fixed order.
    pub schedule: ScheduleManifest,
}

impl RuntimeConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed input or unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Loading runtime config");
        Self::from_toml_str(&source)
    }

    /// Renders the config as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
