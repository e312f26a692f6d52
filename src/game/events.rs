//! Spatial Events
//!
//! Membership transitions recorded during a tick, for replay and debugging.

use serde::{Serialize, Deserialize};
use crate::core::vec2::Vec2;
use crate::grid::node::NodeId;
use crate::game::entity::EntityId;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths first, so later consumers never see a dead sprite move
    Death = 0,
    /// Then removals
    Removal = 1,
    /// Then spawns
    Spawn = 2,
    /// Then ordinary cell changes
    Movement = 3,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpatialEventData {
    /// Sprite entered the world
    Spawned {
        /// Cell the sprite landed in, if any
        node: Option<NodeId>,
    },

    /// Sprite crossed into another cell
    NodeChanged {
        /// Previous cell
        from: Option<NodeId>,
        /// New cell
        to: NodeId,
    },

    /// Sprite died (left the loaded map or was killed)
    Died {
        /// Cell the sprite was registered in
        last_node: Option<NodeId>,
        /// Where it died
        position: Vec2,
    },

    /// Dead sprite removed from the world
    Reaped,
}

/// A spatial event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpatialEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Sprite involved
    pub entity: EntityId,

    /// Event data
    pub data: SpatialEventData,
}

impl SpatialEvent {
    /// Create a new event; priority follows from the payload.
    pub fn new(tick: u32, entity: EntityId, data: SpatialEventData) -> Self {
        let priority = match &data {
            SpatialEventData::Died { .. } => EventPriority::Death,
            SpatialEventData::Reaped => EventPriority::Removal,
            SpatialEventData::Spawned { .. } => EventPriority::Spawn,
            SpatialEventData::NodeChanged { .. } => EventPriority::Movement,
        };

        Self {
            tick,
            priority,
            entity,
            data,
        }
    }

    /// Create spawned event.
    pub fn spawned(tick: u32, entity: EntityId, node: Option<NodeId>) -> Self {
        Self::new(tick, entity, SpatialEventData::Spawned { node })
    }

    /// Create node changed event.
    pub fn node_changed(tick: u32, entity: EntityId, from: Option<NodeId>, to: NodeId) -> Self {
        Self::new(tick, entity, SpatialEventData::NodeChanged { from, to })
    }

    /// Create died event.
    pub fn died(tick: u32, entity: EntityId, last_node: Option<NodeId>, position: Vec2) -> Self {
        Self::new(tick, entity, SpatialEventData::Died { last_node, position })
    }

    /// Create reaped event.
    pub fn reaped(tick: u32, entity: EntityId) -> Self {
        Self::new(tick, entity, SpatialEventData::Reaped)
    }
}

impl PartialEq for SpatialEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.entity == other.entity
    }
}

impl Eq for SpatialEvent {}

impl PartialOrd for SpatialEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpatialEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then entity
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.entity.cmp(&other.entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let moved = SpatialEvent::node_changed(10, EntityId(1), None, NodeId(3));
        let died = SpatialEvent::died(10, EntityId(2), Some(NodeId(4)), Vec2::ZERO);
        let died_earlier_id = SpatialEvent::died(10, EntityId(1), None, Vec2::ZERO);
        let next_tick = SpatialEvent::spawned(11, EntityId(0), None);

        // Same tick, but death < movement
        assert!(died < moved);

        // Same tick and priority, lower entity first
        assert!(died_earlier_id < died);

        assert!(moved < next_tick);
    }

    #[test]
    fn test_event_serializes() {
        let event = SpatialEvent::node_changed(3, EntityId(7), Some(NodeId(1)), NodeId(2));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("NodeChanged"));
        let back: SpatialEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, event.data);
        assert_eq!(back.priority, EventPriority::Movement);
    }
}
