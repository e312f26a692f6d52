//! World Configuration
//!
//! Grid dimensions and simulation rate, loadable from JSON.
//! Every field has a default so partial files are accepted.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::error::{ConfigError, GridError};

/// Default cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f32 = 60.0;

/// Default grid width and height in cells.
pub const DEFAULT_GRID_CELLS: u32 = 128;

/// Default simulation tick rate (Hz).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Dimensions of the spatial grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Columns
    pub width: u32,
    /// Rows
    pub height: u32,
    /// Edge length of one square cell in world units
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_CELLS,
            height: DEFAULT_GRID_CELLS,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl GridConfig {
    /// Create a config with explicit dimensions.
    pub const fn new(width: u32, height: u32, cell_size: f32) -> Self {
        Self { width, height, cell_size }
    }

    /// Number of cells (`width * height`).
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check dimensions and cell size.
    pub fn validate(&self) -> Result<(), GridError> {
        let too_many = (self.width as u64) * (self.height as u64) > u32::MAX as u64;
        if self.width == 0 || self.height == 0 || too_many {
            return Err(GridError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }
}

/// Top-level configuration for a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Grid layout
    pub grid: GridConfig,
    /// Simulation ticks per second
    pub tick_rate: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }

    /// Seconds per tick.
    pub fn tick_delta(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_game_map() {
        let config = WorldConfig::default();
        assert_eq!(config.grid.width, 128);
        assert_eq!(config.grid.height, 128);
        assert_eq!(config.grid.cell_size, 60.0);
        assert_eq!(config.tick_rate, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorldConfig::from_json(r#"{ "grid": { "width": 8 } }"#).unwrap();
        assert_eq!(config.grid.width, 8);
        assert_eq!(config.grid.height, DEFAULT_GRID_CELLS);
        assert_eq!(config.grid.cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(config.tick_rate, DEFAULT_TICK_RATE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            WorldConfig::from_json(r#"{ "grid": { "width": 0 } }"#),
            Err(ConfigError::Invalid(GridError::InvalidDimensions { .. }))
        ));
        assert!(matches!(
            WorldConfig::from_json(r#"{ "grid": { "cell_size": -1.0 } }"#),
            Err(ConfigError::Invalid(GridError::InvalidCellSize(_)))
        ));
        assert!(matches!(
            WorldConfig::from_json(r#"{ "tick_rate": 0 }"#),
            Err(ConfigError::ZeroTickRate)
        ));
        assert!(matches!(
            WorldConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_tick_delta() {
        let config = WorldConfig { tick_rate: 50, ..Default::default() };
        assert!((config.tick_delta() - 0.02).abs() < 1e-6);
    }
}
