//! Controller configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::coverage::{DEFAULT_GRID_DIVISIONS, MAX_GRID_DIVISIONS};
use crate::engine::{SessionConfig, ViewOptions};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Everything the placement controller needs to know up front
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    #[serde(default)]
    pub coverage: CoverageConfig,
    #[serde(default)]
    pub furniture: FurnitureConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub view: ViewOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Sample points per viewport axis
    #[serde(default = "default_grid_divisions")]
    pub grid_divisions: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            grid_divisions: default_grid_divisions(),
        }
    }
}

fn default_grid_divisions() -> usize {
    DEFAULT_GRID_DIVISIONS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureConfig {
    /// Scene file the furniture model is loaded from
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Node inside the scene file to instantiate
    #[serde(default = "default_node_name")]
    pub node_name: String,
    /// Uniform scale applied to each placed instance
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for FurnitureConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            node_name: default_node_name(),
            scale: default_scale(),
        }
    }
}

fn default_model_path() -> String {
    "art.scnassets/Babycrib.scn".to_string()
}

fn default_node_name() -> String {
    "mesh01_07".to_string()
}

fn default_scale() -> f64 {
    0.8
}

impl PlacementConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PlacementConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            info!(path = %path.display(), "Loaded placement configuration");
            Ok(config)
        } else {
            info!(
                path = %path.display(),
                "Configuration file not found, using defaults"
            );
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_GRID_DIVISIONS).contains(&self.coverage.grid_divisions) {
            return Err(ConfigError::ValidationError(format!(
                "coverage.grid_divisions must be between 2 and {}, got {}",
                MAX_GRID_DIVISIONS, self.coverage.grid_divisions
            )));
        }
        if !(self.furniture.scale.is_finite() && self.furniture.scale > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "furniture.scale must be positive, got {}",
                self.furniture.scale
            )));
        }
        if self.furniture.model_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "furniture.model_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
