//! Spatial Grid Module
//!
//! - `node`: single cells, directions, node ids
//! - `spatial`: the node table, world-coordinate lookup, map loading

pub mod node;
pub mod spatial;

pub use node::{Direction, GridNode, NodeId};
pub use spatial::SpatialGrid;
