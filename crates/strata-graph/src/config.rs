//! Layout graph configuration.

use crate::vertex::{DEFAULT_DUMMY_PREFIX, DEFAULT_PRIORITY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: dummy_prefix must not be empty")]
    EmptyDummyPrefix,
}

/// Tunables for a layout graph.
///
/// Every field is optional in the JSON form; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Priority given to vertices created through the builder.
    pub default_priority: i32,

    /// Name prefix for dummy vertices.
    pub dummy_prefix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            dummy_prefix: DEFAULT_DUMMY_PREFIX.to_string(),
        }
    }
}

impl LayoutConfig {
    /// Reads a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        if config.dummy_prefix.is_empty() {
            return Err(ConfigError::EmptyDummyPrefix);
        }
        Ok(config)
    }
}
