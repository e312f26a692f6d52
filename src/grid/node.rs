//! Grid Nodes
//!
//! One square cell of the spatial grid. A node knows its coordinates, whether
//! its terrain is collidable, and which entities are registered inside it.
//! Neighbor links are not stored here; `SpatialGrid::neighbor` computes them
//! from the node's index.

use std::collections::BTreeSet;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::game::entity::EntityId;

// =============================================================================
// NODE ID
// =============================================================================

/// Index of a node in the grid's flat table (`row * width + col`).
///
/// This is the non-owning back-reference a sprite keeps to the cell it
/// occupies. Only meaningful for the grid that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position in the flat node table.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// The eight neighbor directions of a cell.
///
/// Screen orientation: north is the row above (`row - 1`), east is `col + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    NorthEast = 4,
    NorthWest = 5,
    SouthEast = 6,
    SouthWest = 7,
}

impl Direction {
    /// The four axis-aligned directions.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// All eight directions, cardinal first.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Column and row offset of the neighbor in this direction.
    #[inline]
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    /// Direction pointing back the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::NorthEast => Direction::SouthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }

    /// True for north/south/east/west.
    #[inline]
    pub fn is_cardinal(self) -> bool {
        (self as u8) < 4
    }
}

// =============================================================================
// GRID NODE
// =============================================================================

/// A single cell of the spatial grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridNode {
    /// Column index
    pub col: u32,

    /// Row index
    pub row: u32,

    /// Impassable terrain or scenery. Fixed at map load.
    collidable: bool,

    /// Entities currently registered in this cell, keyed by identity.
    occupants: BTreeSet<EntityId>,
}

impl GridNode {
    /// Create an empty node.
    pub fn new(col: u32, row: u32, collidable: bool) -> Self {
        Self {
            col,
            row,
            collidable,
            occupants: BTreeSet::new(),
        }
    }

    /// Does this cell block movement and sight?
    #[inline]
    pub fn collidable(&self) -> bool {
        self.collidable
    }

    /// Register an entity. Returns false if it was already present.
    pub fn enter(&mut self, entity: EntityId) -> bool {
        self.occupants.insert(entity)
    }

    /// Unregister an entity. Returns false if it was not present.
    pub fn leave(&mut self, entity: EntityId) -> bool {
        self.occupants.remove(&entity)
    }

    /// Is this entity registered here?
    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.occupants.contains(&entity)
    }

    /// True iff no occupant satisfies the "collides with me" predicate.
    ///
    /// The predicate is bound to the querying entity and must reject that
    /// entity itself.
    pub fn is_empty_for<F>(&self, collides: F) -> bool
    where
        F: Fn(EntityId) -> bool,
    {
        !self.occupants.iter().any(|&id| collides(id))
    }

    /// Occupants in id order. Do not hold across a membership update.
    pub fn nearby(&self) -> Vec<EntityId> {
        self.occupants.iter().copied().collect()
    }

    /// Iterate occupants in id order.
    pub fn occupants(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.occupants.iter().copied()
    }

    /// Number of registered entities.
    #[inline]
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    /// True if nothing is registered here.
    #[inline]
    pub fn is_vacant(&self) -> bool {
        self.occupants.is_empty()
    }

    pub(crate) fn clear_occupants(&mut self) {
        self.occupants.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_is_idempotent() {
        let mut node = GridNode::new(0, 0, false);
        assert!(node.enter(EntityId(1)));
        assert!(!node.enter(EntityId(1)));
        assert_eq!(node.occupant_count(), 1);
    }

    #[test]
    fn test_leave_missing_is_noop() {
        let mut node = GridNode::new(0, 0, false);
        assert!(!node.leave(EntityId(7)));

        node.enter(EntityId(7));
        assert!(node.leave(EntityId(7)));
        assert!(!node.leave(EntityId(7)));
        assert!(node.is_vacant());
    }

    #[test]
    fn test_is_empty_for_predicate() {
        let mut node = GridNode::new(0, 0, false);
        node.enter(EntityId(1));
        node.enter(EntityId(2));

        // Entity 1 asking: only 2 could collide, and 2 is rejected
        assert!(node.is_empty_for(|id| id != EntityId(1) && id == EntityId(3)));
        // Entity 1 asking, 2 collides
        assert!(!node.is_empty_for(|id| id != EntityId(1)));
        // Empty node is always clear
        assert!(GridNode::new(1, 1, true).is_empty_for(|_| true));
    }

    #[test]
    fn test_nearby_sorted() {
        let mut node = GridNode::new(0, 0, false);
        node.enter(EntityId(9));
        node.enter(EntityId(3));
        node.enter(EntityId(5));
        assert_eq!(node.nearby(), vec![EntityId(3), EntityId(5), EntityId(9)]);
    }

    #[test]
    fn test_direction_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        assert!(Direction::CARDINAL.iter().all(|d| d.is_cardinal()));
        assert!(!Direction::NorthEast.is_cardinal());
    }
}
