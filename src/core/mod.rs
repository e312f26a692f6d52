//! Core primitives.
//!
//! Geometry shared by the grid and the entity layer.

pub mod vec2;

// Re-export core types
pub use vec2::Vec2;
