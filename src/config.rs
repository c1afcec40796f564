//! Engine Configuration
//!
//! JSON with every field defaulted, so an empty object is a valid config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::font_size::FontSizeMultipliers;
use crate::validation::{DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_max_edits")]
    pub max_edits: usize,
    #[serde(default = "default_max_delta")]
    pub max_delta: f64,
    #[serde(default)]
    pub font_size_multipliers: FontSizeMultipliers,
    #[serde(default = "default_font_size")]
    pub default_font_size: u32,
}

fn default_max_edits() -> usize { DEFAULT_MAX_EDITS }
fn default_max_delta() -> f64 { DEFAULT_MAX_DELTA }
fn default_font_size() -> u32 { 16 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_edits: default_max_edits(),
            max_delta: default_max_delta(),
            font_size_multipliers: FontSizeMultipliers::default(),
            default_font_size: default_font_size(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_delta.is_finite() || self.max_delta < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "maxDelta must be a non-negative number, got {}",
                self.max_delta
            )));
        }
        if self.default_font_size == 0 {
            return Err(ConfigError::Invalid("defaultFontSize must be positive".to_string()));
        }
        for (keyword, factor) in self.font_size_multipliers.values() {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "font size multiplier {keyword:?} must be positive, got {factor}"
                )));
            }
        }
        Ok(())
    }
}
