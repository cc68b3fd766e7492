//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! log_level = "debug"
//!
//! [[bins]]
//! id = 1
//! capacity = 10
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::BinId;
use crate::error::AllocError;
use crate::telemetry::{self, LogLevel, TelemetryError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot provision bins: {0}")]
    Alloc(#[from] AllocError),
}

/// A bin to create at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinSpec {
    pub id: BinId,
    pub capacity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub log_level: LogLevel,
    /// Created in order; a repeated id fails provisioning.
    pub bins: Vec<BinSpec>,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Installs the global subscriber at the configured `log_level`.
    pub fn init_logging(&self) -> Result<(), TelemetryError> {
        telemetry::init(self.log_level)
    }
}
