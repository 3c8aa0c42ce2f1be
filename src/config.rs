//! Configuration for ccpatch
//!
//! Loaded from an optional YAML file. Every key has a default so the tool
//! runs with no configuration at all.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CCPATCH_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ccpatch.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Substring identifying the controller's MIDI ports
    pub controller_port: String,
    /// Substring identifying the downstream instrument output port
    pub instrument_port: String,
    /// Directory where saved patches are written
    pub patch_dir: PathBuf,
    /// Settling delay before LED feedback is refreshed
    pub feedback_delay_ms: u64,
    /// Minimum spacing between reconnection attempts
    pub reconnect_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            controller_port: "BeatStep".to_string(),
            instrument_port: "in_from_ccpatch".to_string(),
            patch_dir: PathBuf::from("."),
            feedback_delay_ms: 250,
            reconnect_interval_ms: 2000,
        }
    }
}

impl AppConfig {
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms.max(1))
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Resolve the config file from the environment and load it
    ///
    /// An explicitly named file must exist; the implicit `ccpatch.yaml` is
    /// optional and its absence yields the defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            info!("Loading configuration from {}", explicit);
            return Self::load(explicit);
        }

        let implicit = Path::new(DEFAULT_CONFIG_FILE);
        if implicit.exists() {
            info!("Loading configuration from {}", implicit.display());
            Self::load(implicit)
        } else {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }
}
