//! Generator configuration: grid bounds, retry bound and render colours.
//!
//! ```
//! use houseplan_logic::config::{validate_config, GeneratorConfig};
//!
//! let mut config = GeneratorConfig::default();
//! config.grid_width = 40;
//! config.grid_height = 30;
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GRID_WIDTH: u32 = 80;
pub const DEFAULT_GRID_HEIGHT: u32 = 60;
/// Independent, fully reset attempts before generation gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Grid sides beyond this are rejected; cell indices are `i32`.
pub const MAX_GRID_SIDE: u32 = 4096;

pub const DOOR_COLOR: &str = "#f59e0b";
pub const WALL_COLOR: &str = "#4b5563";
pub const EMPTY_COLOR: &str = "#ffffff";

/// Fixed at engine construction; each generation builds fresh grids from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub max_attempts: u32,
    pub door_color: String,
    pub wall_color: String,
    pub empty_color: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            door_color: DOOR_COLOR.to_string(),
            wall_color: WALL_COLOR.to_string(),
            empty_color: EMPTY_COLOR.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_grid(width: u32, height: u32) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Self::default()
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1 (got {0}x{1})")]
    EmptyGrid(u32, u32),
    #[error("grid side exceeds {max} cells (got {0}x{1})", max = MAX_GRID_SIDE)]
    GridTooLarge(u32, u32),
    #[error("max_attempts must be at least 1")]
    NoAttempts,
}

/// Validate a generator configuration, returning all errors found.
pub fn validate_config(config: &GeneratorConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.grid_width == 0 || config.grid_height == 0 {
        errors.push(ConfigError::EmptyGrid(config.grid_width, config.grid_height));
    }
    if config.grid_width > MAX_GRID_SIDE || config.grid_height > MAX_GRID_SIDE {
        errors.push(ConfigError::GridTooLarge(
            config.grid_width,
            config.grid_height,
        ));
    }
    if config.max_attempts == 0 {
        errors.push(ConfigError::NoAttempts);
    }

    errors
}
