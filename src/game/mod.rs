//! Game Module
//!
//! Sprites and everything that reads or writes their grid membership.
//!
//! ## Module Structure
//!
//! - `entity`: Sprites, ids, collision categories
//! - `membership`: Enter/leave transitions and out-of-bounds death
//! - `query`: Broad-phase 3x3 neighborhood checks
//! - `sight`: DDA line-of-sight raycast
//! - `events`: Membership events for replay/debugging
//! - `world`: Grid plus sprite table, per-tick update

pub mod entity;
pub mod membership;
pub mod query;
pub mod sight;
pub mod events;
pub mod world;

// Re-export key types
pub use entity::{CollisionCategory, EntityId, Sprite};
pub use membership::{die, update_grid_membership, MembershipChange};
pub use query::{is_clear, nearby, nearby_in_neighborhood};
pub use sight::{can_see, GridRay};
pub use events::{SpatialEvent, SpatialEventData};
pub use world::World;
