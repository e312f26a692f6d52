//! Grid Membership
//!
//! Keeps each sprite registered in exactly the node under its position.
//! Called once per movement step, after the position changes.
//!
//! The update always resolves the node first and compares it with the
//! current one, so repeated calls without movement never re-register and a
//! move always leaves the old node before entering the new one.

use tracing::{debug, trace};

use crate::grid::node::NodeId;
use crate::grid::spatial::SpatialGrid;
use crate::game::entity::Sprite;

/// Outcome of a membership update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipChange {
    /// Sprite is invisible and unregistered; nothing was touched
    Inactive,
    /// Sprite was hidden since the last update and has been unregistered
    Hidden {
        /// Node it was removed from
        last: NodeId,
    },
    /// Still in the same node
    Unchanged(NodeId),
    /// Left `from` (if registered) and entered `to`
    Moved {
        /// Previous node
        from: Option<NodeId>,
        /// New node
        to: NodeId,
    },
    /// Position fell outside the loaded grid; the sprite died
    Died {
        /// Node it was removed from
        last: Option<NodeId>,
    },
}

/// Re-resolve a sprite's node after it moved.
///
/// Off-grid positions kill the sprite (see [`die`]).
pub fn update_grid_membership(grid: &mut SpatialGrid, sprite: &mut Sprite) -> MembershipChange {
    if !sprite.visible {
        // Hidden without dying: unregister but leave `reap` alone
        let Some(last) = sprite.current_node.take() else {
            return MembershipChange::Inactive;
        };
        if let Some(node) = grid.get_mut(last) {
            node.leave(sprite.id);
        }
        trace!("{} hidden, left {}", sprite.id, last);
        return MembershipChange::Hidden { last };
    }

    let Some(new_node) = grid.node_at(sprite.position) else {
        debug!(
            "{} left the loaded map at {}, killing",
            sprite.id, sprite.position
        );
        let last = die(grid, sprite);
        return MembershipChange::Died { last };
    };

    if sprite.current_node == Some(new_node) {
        return MembershipChange::Unchanged(new_node);
    }

    let from = sprite.current_node;
    if let Some(old) = from.and_then(|id| grid.get_mut(id)) {
        old.leave(sprite.id);
    }
    if let Some(node) = grid.get_mut(new_node) {
        node.enter(sprite.id);
    }
    sprite.current_node = Some(new_node);

    trace!("{} moved {:?} -> {}", sprite.id, from, new_node);
    MembershipChange::Moved { from, to: new_node }
}

/// Terminal transition: hide, flag for removal, unregister.
///
/// Returns the node the sprite was removed from. Safe to call twice.
pub fn die(grid: &mut SpatialGrid, sprite: &mut Sprite) -> Option<NodeId> {
    sprite.visible = false;
    sprite.reap = true;

    let last = sprite.current_node.take();
    if let Some(node) = last.and_then(|id| grid.get_mut(id)) {
        node.leave(sprite.id);
    }
    last
}
