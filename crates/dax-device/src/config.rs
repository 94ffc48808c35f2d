//! Device configuration.
//!
//! Parameters that control how adapters map work onto hardware:
//! thread-pool size and kernel launch limits. Loaded from TOML.

use dax_types::{DaxError, DaxResult};
use serde::{Deserialize, Serialize};

/// Configuration for the parallel device adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Worker threads for a dedicated thread pool.
    /// `None` runs on the global rayon pool.
    pub num_threads: Option<usize>,

    /// Logical threads per block for kernel launches.
    pub threads_per_block: usize,

    /// Upper bound on blocks per launch. Larger schedules stride.
    pub max_blocks: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            threads_per_block: 128,
            max_blocks: 32_768,
        }
    }
}

impl DeviceConfig {
    /// Creates a config for debugging: one worker, one single-thread block.
    /// Every parallel adapter then visits instances in index order.
    pub fn debug() -> Self {
        Self {
            num_threads: Some(1),
            threads_per_block: 1,
            max_blocks: 1,
        }
    }

    /// Parses a config from TOML text and validates it.
    /// Missing keys take their default values.
    pub fn from_toml_str(text: &str) -> DaxResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| DaxError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to TOML text.
    pub fn to_toml_string(&self) -> DaxResult<String> {
        toml::to_string(self).map_err(|e| DaxError::Serialization(e.to_string()))
    }

    /// Validates that all limits are positive.
    pub fn validate(&self) -> DaxResult<()> {
        if self.num_threads == Some(0) {
            return Err(DaxError::InvalidConfig("num_threads must be positive".into()));
        }
        if self.threads_per_block == 0 {
            return Err(DaxError::InvalidConfig(
                "threads_per_block must be positive".into(),
            ));
        }
        if self.max_blocks == 0 {
            return Err(DaxError::InvalidConfig("max_blocks must be positive".into()));
        }
        Ok(())
    }
}
