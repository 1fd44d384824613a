//! Mapper configuration.
//!
//! ```toml
//! resolution_mm = 18
//! initial_width = 250
//! initial_height = 250
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration validation errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Resolution below one millimeter per cell.
    #[error("Resolution cannot be less than 1 (got {0})")]
    InvalidResolution(i32),

    /// Grid with a zero dimension.
    #[error("Grid dimensions must be at least 1x1 (got {width}x{height})")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
}

/// Submapper and global mapper settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Millimeters per cell.
    pub resolution_mm: i32,
    /// Global grid width before any resize.
    pub initial_width: usize,
    /// Global grid height before any resize.
    pub initial_height: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            resolution_mm: 18,
            initial_width: 250,
            initial_height: 250,
        }
    }
}

impl MapperConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: MapperConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.resolution_mm < 1 {
            return Err(ConfigError::InvalidResolution(self.resolution_mm));
        }
        if self.initial_width == 0 || self.initial_height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.initial_width,
                height: self.initial_height,
            });
        }
        Ok(())
    }
}
