//! Engine configuration, loaded from TOML. Every section defaults independently.

pub mod confidence_config;
pub mod consolidation_config;
pub mod defaults;
pub mod logging_config;
pub mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use confidence_config::ConfidenceConfig;
pub use consolidation_config::ConsolidationConfig;
pub use logging_config::LoggingConfig;
pub use storage_config::StorageConfig;

use crate::errors::{BrainError, BrainResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub confidence: ConfidenceConfig,
    pub consolidation: ConsolidationConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl BrainConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(raw: &str) -> BrainResult<Self> {
        toml::from_str(raw).map_err(|e| BrainError::ConfigError(e.to_string()))
    }

    /// Load from a TOML file on disk.
    pub fn load(path: &Path) -> BrainResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BrainError::ConfigError(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }
}
