//! Broad-Phase Queries
//!
//! Cheap proximity checks at cell resolution. `is_clear` looks at the 3x3
//! block of cells around a position; it can report clear for sprites that
//! overlap across a cell boundary, so exact overlap needs a geometric test
//! afterwards.

use crate::core::vec2::Vec2;
use crate::grid::node::NodeId;
use crate::grid::spatial::SpatialGrid;
use crate::game::entity::{EntityId, Sprite};

/// Center node for a broad-phase check.
///
/// An explicit `position` wins; otherwise the registered node, falling back
/// to the node under the sprite's own position.
fn center_node(grid: &SpatialGrid, sprite: &Sprite, position: Option<Vec2>) -> Option<NodeId> {
    match position {
        Some(pos) => grid.node_at(pos),
        None => sprite.current_node.or_else(|| grid.node_at(sprite.position)),
    }
}

/// Is the 3x3 neighborhood around `position` free of colliding occupants?
///
/// `collides` decides whether an occupant collides with `sprite`; the sprite
/// itself is always skipped. Cells past the map edge count as clear, and a
/// position with no node at all is clear.
pub fn is_clear<F>(grid: &SpatialGrid, sprite: &Sprite, position: Option<Vec2>, collides: F) -> bool
where
    F: Fn(EntityId) -> bool,
{
    let Some(center) = center_node(grid, sprite, position) else {
        return true;
    };

    let me = sprite.id;
    grid.neighborhood(center)
        .into_iter()
        .flatten()
        .all(|id| grid.node(id).is_empty_for(|other| other != me && collides(other)))
}

/// Other occupants of the sprite's own cell.
///
/// Only valid until the next membership update.
pub fn nearby(grid: &SpatialGrid, sprite: &Sprite) -> Vec<EntityId> {
    let Some(node) = sprite.current_node.and_then(|id| grid.get(id)) else {
        return Vec::new();
    };
    node.occupants().filter(|&id| id != sprite.id).collect()
}

/// Other occupants of the 3x3 block around the sprite's cell, in cell order.
pub fn nearby_in_neighborhood(grid: &SpatialGrid, sprite: &Sprite) -> Vec<EntityId> {
    let Some(center) = sprite.current_node else {
        return Vec::new();
    };
    grid.neighborhood(center)
        .into_iter()
        .flatten()
        .flat_map(move |id| grid.node(id).occupants())
        .filter(|&id| id != sprite.id)
        .collect()
}
