//! # Roadgrid
//!
//! Spatial backbone for a top-down driving game: a grid index of which
//! sprite is in which cell, broad-phase "is anything near me" checks, and
//! line-of-sight raycasts through the grid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         ROADGRID                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Geometry                                  │
//! │  └── vec2.rs     - World-space 2D vector                     │
//! │                                                              │
//! │  grid/           - Static topology, dynamic occupancy        │
//! │  ├── node.rs     - Cells, directions, node ids               │
//! │  └── spatial.rs  - Node table, world lookup, map loading     │
//! │                                                              │
//! │  game/           - Sprites on the grid                       │
//! │  ├── entity.rs   - Sprites and collision categories          │
//! │  ├── membership.rs - Enter/leave, out-of-bounds death        │
//! │  ├── query.rs    - Broad-phase 3x3 checks                    │
//! │  ├── sight.rs    - DDA line of sight                         │
//! │  ├── events.rs   - Membership events                         │
//! │  └── world.rs    - Per-tick update pipeline                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tick Model
//!
//! Single-threaded. Each tick every sprite moves and then re-resolves its
//! node; queries read the grid as it stands at the moment they are made.
//! Query results (such as `nearby` lists) must not be kept across the next
//! membership update.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod grid;

// Re-export commonly used types
pub use config::{GridConfig, WorldConfig, DEFAULT_CELL_SIZE};
pub use crate::core::vec2::Vec2;
pub use error::{ConfigError, GridError};
pub use game::entity::{CollisionCategory, EntityId, Sprite};
pub use game::world::World;
pub use grid::{Direction, GridNode, NodeId, SpatialGrid};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
