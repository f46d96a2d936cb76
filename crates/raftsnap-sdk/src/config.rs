use std::path::{Path, PathBuf};

use raftsnap_projection::KvStatsConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Settings for one inspection run.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// load_values = false
/// channel_capacity = 1024
///
/// [kv]
/// enabled = true
/// depth = 3
/// filter = "logical/"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub kv: KvStatsConfig,
    /// Keep record values in the projection instead of a placeholder.
    pub load_values: bool,
    /// Decoded records buffered ahead of the projection.
    pub channel_capacity: usize,
    /// Where the verified `state.bin` is staged. System temp dir if unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            kv: KvStatsConfig::default(),
            load_values: false,
            channel_capacity: 1024,
            scratch_dir: None,
        }
    }
}

impl InspectConfig {
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SdkError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> SdkResult<()> {
        self.kv.validate()?;
        if self.channel_capacity == 0 {
            return Err(SdkError::Config(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
