//! Error types.
//!
//! Leaving the loaded map is not an error: it is the death transition in
//! `game::membership`. These errors cover malformed map data, bad
//! configuration, and lookups of entities the world does not know.

use thiserror::Error;

use crate::game::entity::EntityId;

/// Grid construction and world lookup errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Width or height is zero, or the node count overflows a `NodeId`.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested column count
        width: u32,
        /// Requested row count
        height: u32,
    },

    /// Cell size must be finite and positive.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f32),

    /// Collision mask does not cover the grid exactly.
    #[error("collision mask has {actual} cells, expected {expected}")]
    MaskSizeMismatch {
        /// `width * height`
        expected: usize,
        /// Length of the supplied mask
        actual: usize,
    },

    /// A map row has a different length from the first row.
    #[error("map row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Offending row index
        row: usize,
        /// Width established by row 0
        expected: usize,
        /// Width of the offending row
        actual: usize,
    },

    /// A map row contains a glyph other than `#` or `.`.
    #[error("unknown map glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph {
        /// The unexpected character
        glyph: char,
        /// Column of the glyph
        col: usize,
        /// Row of the glyph
        row: usize,
    },

    /// No sprite with this id is registered in the world.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for `WorldConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed values are out of range.
    #[error("invalid config: {0}")]
    Invalid(#[from] GridError),

    /// Tick rate must be non-zero.
    #[error("tick rate must be at least 1 Hz")]
    ZeroTickRate,
}
