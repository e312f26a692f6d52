//! World
//!
//! Owns the grid and every sprite for one loaded map. Positions only change
//! through methods that re-resolve membership in the same call, so a sprite's
//! position and its registered node never disagree between calls.
//!
//! Sprites are processed in id order (BTreeMap), so sprites updated earlier
//! in a tick are already current when later ones query the grid.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::WorldConfig;
use crate::core::vec2::Vec2;
use crate::error::GridError;
use crate::grid::node::NodeId;
use crate::grid::spatial::SpatialGrid;
use crate::game::entity::{EntityId, Sprite};
use crate::game::events::SpatialEvent;
use crate::game::membership::{die, update_grid_membership, MembershipChange};
use crate::game::query;
use crate::game::sight;

/// Map a membership change to the event it produces, if any.
fn change_event(tick: u32, sprite: &Sprite, change: MembershipChange) -> Option<SpatialEvent> {
    match change {
        MembershipChange::Moved { from, to } => {
            Some(SpatialEvent::node_changed(tick, sprite.id, from, to))
        }
        MembershipChange::Died { last } => {
            Some(SpatialEvent::died(tick, sprite.id, last, sprite.position))
        }
        MembershipChange::Inactive
        | MembershipChange::Hidden { .. }
        | MembershipChange::Unchanged(_) => None,
    }
}

/// Grid plus sprite table.
#[derive(Clone, Debug)]
pub struct World {
    grid: SpatialGrid,
    sprites: BTreeMap<EntityId, Sprite>,
    next_id: u32,
    tick: u32,
    events: Vec<SpatialEvent>,
}

impl World {
    /// Create an empty world on a loaded grid.
    pub fn new(grid: SpatialGrid) -> Self {
        Self {
            grid,
            sprites: BTreeMap::new(),
            next_id: 1,
            tick: 0,
            events: Vec::new(),
        }
    }

    /// Create an empty world with an all-clear grid from config.
    pub fn from_config(config: &WorldConfig) -> Result<Self, GridError> {
        Ok(Self::new(SpatialGrid::new(&config.grid)?))
    }

    /// The spatial grid (read-only; membership is managed here).
    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Ticks run so far.
    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Look up a sprite.
    pub fn sprite(&self, id: EntityId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    /// All sprites in id order, including dead ones not yet reaped.
    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.values()
    }

    /// Number of sprites (alive or awaiting reap).
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// No sprites at all?
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Number of sprites still alive.
    pub fn alive_count(&self) -> usize {
        self.sprites.values().filter(|s| s.is_alive()).count()
    }

    fn get(&self, id: EntityId) -> Result<&Sprite, GridError> {
        self.sprites.get(&id).ok_or(GridError::UnknownEntity(id))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Add a sprite, assign its id and register it in the grid.
    ///
    /// A visible sprite placed off the loaded map dies immediately.
    pub fn spawn(&mut self, mut sprite: Sprite) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        sprite.id = id;
        sprite.current_node = None;

        let change = update_grid_membership(&mut self.grid, &mut sprite);
        self.events.push(SpatialEvent::spawned(self.tick, id, sprite.current_node));
        if let MembershipChange::Died { .. } = change {
            self.events.extend(change_event(self.tick, &sprite, change));
        }

        debug!("Spawned {} '{}' at {}", id, sprite.name, sprite.position);
        self.sprites.insert(id, sprite);
        id
    }

    /// Mutate a sprite, then re-resolve its membership.
    pub fn update_sprite<F>(&mut self, id: EntityId, f: F) -> Result<MembershipChange, GridError>
    where
        F: FnOnce(&mut Sprite),
    {
        let sprite = self.sprites.get_mut(&id).ok_or(GridError::UnknownEntity(id))?;
        f(sprite);
        sprite.id = id;

        let change = update_grid_membership(&mut self.grid, sprite);
        self.events.extend(change_event(self.tick, sprite, change));
        Ok(change)
    }

    /// Teleport a sprite.
    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> Result<MembershipChange, GridError> {
        self.update_sprite(id, |s| s.position = position)
    }

    /// Re-resolve a sprite's membership without moving it.
    pub fn update_membership(&mut self, id: EntityId) -> Result<MembershipChange, GridError> {
        self.update_sprite(id, |_| {})
    }

    /// Kill a sprite. Returns the node it was removed from.
    pub fn kill(&mut self, id: EntityId) -> Result<Option<NodeId>, GridError> {
        let sprite = self.sprites.get_mut(&id).ok_or(GridError::UnknownEntity(id))?;
        if !sprite.visible {
            return Ok(None);
        }
        let last = die(&mut self.grid, sprite);
        self.events.push(SpatialEvent::died(self.tick, id, last, sprite.position));
        Ok(last)
    }

    /// Advance every sprite by `delta` seconds: move, then update membership.
    ///
    /// Returns the events recorded during this tick.
    pub fn run(&mut self, delta: f32) -> Vec<SpatialEvent> {
        self.tick += 1;
        let tick = self.tick;

        for sprite in self.sprites.values_mut() {
            sprite.integrate(delta);
            let change = update_grid_membership(&mut self.grid, sprite);
            self.events.extend(change_event(tick, sprite, change));
        }

        let mut events = self.take_events();
        events.sort();
        events
    }

    /// Remove every sprite flagged for reaping.
    pub fn reap(&mut self) -> Vec<EntityId> {
        let doomed: Vec<EntityId> = self
            .sprites
            .values()
            .filter(|s| s.reap)
            .map(|s| s.id)
            .collect();

        for id in &doomed {
            if let Some(mut sprite) = self.sprites.remove(id) {
                // Already unregistered by `die`; a sprite flagged by hand may not be
                die(&mut self.grid, &mut sprite);
            }
            self.events.push(SpatialEvent::reaped(self.tick, *id));
        }

        if !doomed.is_empty() {
            debug!("Reaped {} sprites", doomed.len());
        }
        doomed
    }

    /// Replace the grid (map reload) and re-register every live sprite.
    ///
    /// Sprites outside the new map die.
    pub fn reload(&mut self, grid: SpatialGrid) {
        info!(
            "Reloading grid {}x{} -> {}x{}",
            self.grid.width(),
            self.grid.height(),
            grid.width(),
            grid.height()
        );
        self.grid = grid;
        self.grid.clear_occupants();

        let tick = self.tick;
        for sprite in self.sprites.values_mut() {
            sprite.current_node = None;
            let change = update_grid_membership(&mut self.grid, sprite);
            self.events.extend(change_event(tick, sprite, change));
        }
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<SpatialEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Broad-phase check around a sprite (or a probe position for it).
    pub fn is_clear(&self, id: EntityId, position: Option<Vec2>) -> Result<bool, GridError> {
        let sprite = self.get(id)?;
        Ok(query::is_clear(&self.grid, sprite, position, |other| {
            self.sprites
                .get(&other)
                .is_some_and(|o| sprite.collides_with(o))
        }))
    }

    /// Line of sight from one sprite to another.
    pub fn can_see(&self, source: EntityId, target: EntityId) -> Result<bool, GridError> {
        Ok(sight::can_see(&self.grid, self.get(source)?, self.get(target)?))
    }

    /// Other sprites in this sprite's cell.
    pub fn nearby(&self, id: EntityId) -> Result<Vec<EntityId>, GridError> {
        Ok(query::nearby(&self.grid, self.get(id)?))
    }

    /// Other sprites in the 3x3 block around this sprite's cell.
    pub fn nearby_in_neighborhood(&self, id: EntityId) -> Result<Vec<EntityId>, GridError> {
        Ok(query::nearby_in_neighborhood(&self.grid, self.get(id)?))
    }
}
