//! Simulator configuration loading

use anyhow::{Context, Result};
use placement_core::{PlacementConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// View width in points
    #[serde(default = "default_width")]
    pub width: f64,
    /// View height in points
    #[serde(default = "default_height")]
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl ViewportConfig {
    pub fn to_viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

fn default_width() -> f64 {
    375.0
}

fn default_height() -> f64 {
    812.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pretend the device can do world tracking
    #[serde(default = "default_true")]
    pub world_tracking_supported: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_tracking_supported: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Event queue capacity between the replayer and the controller
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Pause after every step unless the step sets its own
    #[serde(default)]
    pub step_delay_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            step_delay_ms: 0,
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

impl Config {
    fn validate(&self) -> Result<()> {
        self.placement.validate()?;
        anyhow::ensure!(
            self.viewport.width > 0.0 && self.viewport.height > 0.0,
            "viewport must have a positive size, got {}x{}",
            self.viewport.width,
            self.viewport.height
        );
        anyhow::ensure!(self.replay.queue_capacity > 0, "replay.queue_capacity must be positive");
        Ok(())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        config
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Config::default()
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config.viewport.width, 375.0);
        assert_eq!(config.replay.queue_capacity, 64);
        assert!(config.engine.world_tracking_supported);
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn test_nested_placement_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placement.toml");
        std::fs::write(
            &path,
            r#"
[placement.furniture]
scale = 0.5

[placement.coverage]
grid_divisions = 3

[viewport]
width = 1024
height = 768
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.placement.furniture.scale, 0.5);
        assert_eq!(config.placement.coverage.grid_divisions, 3);
        assert_eq!(config.viewport.to_viewport(), Viewport::new(1024.0, 768.0));
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[viewport]\nwidth = 0\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
