//! Editor configuration
//! Stage dimensions and view defaults, loadable from a JSON file

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::Stage;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "FLOORPLAN_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub stage_width: f64,
    pub stage_height: f64,
    /// Right/bottom clearance for machines and zones
    pub margin: f64,
    /// Initial zoom, clamped to the editor's zoom range
    pub zoom: f64,
    /// Distance from a grid line, in screen pixels, at which drag guides appear
    pub guide_threshold: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            stage_width: 1200.0,
            stage_height: 720.0,
            margin: 10.0,
            zoom: 1.0,
            guide_threshold: 4.0,
        }
    }
}

impl EditorConfig {
    pub fn stage(&self) -> Stage {
        Stage::new(self.stage_width, self.stage_height, self.margin)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Load from `$FLOORPLAN_CONFIG`, falling back to defaults
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("{} ({}), using defaults", e, path);
                Self::default()
            }
        }
    }
}
