use crate::adaptive::AdaptiveTuning;
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Controller configuration.  Every field has a sensible default so an
/// empty TOML file (or none at all) yields a working player.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlayerConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub adaptive: AdaptiveTuning,
}

impl PlayerConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
