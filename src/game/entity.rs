//! Sprites
//!
//! Mobile entities tracked by the spatial grid: cars, pedestrians, props.
//! A sprite owns its own motion state and holds a non-owning `NodeId` for the
//! cell it is registered in.

use std::fmt;
use std::ops::BitOr;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::grid::node::NodeId;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Identity of a sprite. Occupant sets are keyed by this, never by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

// =============================================================================
// COLLISION CATEGORY
// =============================================================================

/// Bitmask of collision categories.
///
/// A sprite has a `category` (what it is) and a `collides_with` mask (what it
/// cares about). Two sprites interact when the querying sprite's mask
/// intersects the other's category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionCategory(pub u8);

impl CollisionCategory {
    /// Matches nothing
    pub const NONE: Self = Self(0);
    /// Cars and trucks
    pub const VEHICLE: Self = Self(1 << 0);
    /// People on foot
    pub const PEDESTRIAN: Self = Self(1 << 1);
    /// Bullets and thrown objects
    pub const PROJECTILE: Self = Self(1 << 2);
    /// Barrels, trees and other props
    pub const SCENERY: Self = Self(1 << 3);
    /// Matches everything
    pub const ALL: Self = Self(u8::MAX);

    /// Combine two masks.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Any bit in common?
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Every bit of `other` present in `self`?
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CollisionCategory {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// =============================================================================
// SPRITE
// =============================================================================

/// A mobile entity in the world.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sprite {
    /// Identity (assigned by `World::spawn`)
    pub id: EntityId,

    /// Config name, e.g. "car1"
    pub name: String,

    /// World position
    pub position: Vec2,

    /// Heading in degrees, kept within [0, 360]
    pub rotation: f32,

    /// Units per second
    pub velocity: Vec2,

    /// Degrees per second
    pub angular_velocity: f32,

    /// Units per second squared
    pub acceleration: Vec2,

    /// Degrees per second squared
    pub angular_acceleration: f32,

    /// Render scale
    pub scale: f32,

    /// Alive and drawn. Cleared on death.
    pub visible: bool,

    /// Flagged for removal by the game loop
    pub reap: bool,

    /// Takes part in broad-phase collision at all
    pub collidable: bool,

    /// What this sprite is
    pub category: CollisionCategory,

    /// What this sprite collides with
    pub collides_with: CollisionCategory,

    /// Cell this sprite is registered in. Written only by `game::membership`.
    pub current_node: Option<NodeId>,
}

impl Sprite {
    /// Create a visible, stationary, non-collidable sprite.
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: EntityId::default(),
            name: name.into(),
            position,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            acceleration: Vec2::ZERO,
            angular_acceleration: 0.0,
            scale: 1.0,
            visible: true,
            reap: false,
            collidable: false,
            category: CollisionCategory::NONE,
            collides_with: CollisionCategory::NONE,
            current_node: None,
        }
    }

    /// Make this sprite collidable as `category`, colliding with `mask`.
    pub fn with_collision(mut self, category: CollisionCategory, mask: CollisionCategory) -> Self {
        self.collidable = true;
        self.category = category;
        self.collides_with = mask;
        self
    }

    /// Set the initial heading in degrees.
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set the initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Visible and not awaiting removal.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.visible && !self.reap
    }

    /// Advance motion by `delta` seconds. Dead sprites do not move.
    pub fn integrate(&mut self, delta: f32) {
        if !self.visible {
            return;
        }

        self.velocity = self.velocity.add(self.acceleration.scale(delta));
        self.angular_velocity += self.angular_acceleration * delta;
        self.position = self.position.add(self.velocity.scale(delta));
        self.rotation += self.angular_velocity * delta;

        if self.rotation > 360.0 {
            self.rotation -= 360.0;
        } else if self.rotation < 0.0 {
            self.rotation += 360.0;
        }
    }

    /// The "collides with me" capability test.
    ///
    /// Never true for the sprite itself, for dead sprites, or for sprites
    /// that do not take part in collision.
    pub fn collides_with(&self, other: &Sprite) -> bool {
        if self.id == other.id {
            return false;
        }
        if !other.collidable || !other.visible {
            return false;
        }
        self.collides_with.intersects(other.category)
    }

    /// Straight-line distance to another sprite.
    #[inline]
    pub fn distance(&self, other: &Sprite) -> f32 {
        self.position.distance(other.position)
    }

    /// Rotate a sprite-relative vector into world orientation.
    #[inline]
    pub fn relative_to_world(&self, relative: Vec2) -> Vec2 {
        relative.rotate_degrees(self.rotation)
    }

    /// Rotate a world vector into this sprite's frame.
    #[inline]
    pub fn world_to_relative(&self, world: Vec2) -> Vec2 {
        world.rotate_degrees(-self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: u32) -> Sprite {
        let mut s = Sprite::new("car1", Vec2::ZERO).with_collision(
            CollisionCategory::VEHICLE,
            CollisionCategory::VEHICLE | CollisionCategory::SCENERY,
        );
        s.id = EntityId(id);
        s
    }

    #[test]
    fn test_category_masks() {
        let mask = CollisionCategory::VEHICLE | CollisionCategory::PEDESTRIAN;
        assert!(mask.intersects(CollisionCategory::PEDESTRIAN));
        assert!(!mask.intersects(CollisionCategory::PROJECTILE));
        assert!(mask.contains(CollisionCategory::VEHICLE));
        assert!(!CollisionCategory::NONE.intersects(CollisionCategory::ALL));
        assert!(CollisionCategory::ALL.contains(mask));
    }

    #[test]
    fn test_never_collides_with_self() {
        let a = car(1);
        assert!(!a.collides_with(&a));
        assert!(a.collides_with(&car(2)));
    }

    #[test]
    fn test_collision_requires_category_match() {
        let a = car(1);
        let mut walker = Sprite::new("dude", Vec2::ZERO)
            .with_collision(CollisionCategory::PEDESTRIAN, CollisionCategory::VEHICLE);
        walker.id = EntityId(2);

        // Walker cares about cars, the car does not care about walkers
        assert!(walker.collides_with(&a));
        assert!(!a.collides_with(&walker));
    }

    #[test]
    fn test_dead_or_passive_never_collide() {
        let a = car(1);
        let mut b = car(2);
        b.visible = false;
        assert!(!a.collides_with(&b));

        let mut c = car(3);
        c.collidable = false;
        assert!(!a.collides_with(&c));
    }

    #[test]
    fn test_integrate() {
        let mut s = Sprite::new("car1", Vec2::new(10.0, 10.0))
            .with_velocity(Vec2::new(2.0, 0.0));
        s.acceleration = Vec2::new(0.0, 4.0);
        s.integrate(0.5);
        // Velocity updated first, then position
        assert_eq!(s.velocity, Vec2::new(2.0, 2.0));
        assert_eq!(s.position, Vec2::new(11.0, 11.0));
    }

    #[test]
    fn test_rotation_wraps() {
        let mut s = Sprite::new("car1", Vec2::ZERO).with_rotation(350.0);
        s.angular_velocity = 40.0;
        s.integrate(0.5);
        assert!((s.rotation - 10.0).abs() < 1e-4);

        s.angular_velocity = -40.0;
        s.integrate(0.5);
        assert!((s.rotation - 350.0).abs() < 1e-4);
    }

    #[test]
    fn test_dead_sprite_does_not_move() {
        let mut s = Sprite::new("car1", Vec2::ZERO).with_velocity(Vec2::new(5.0, 5.0));
        s.visible = false;
        s.integrate(1.0);
        assert_eq!(s.position, Vec2::ZERO);
    }

    #[test]
    fn test_relative_world_round_trip() {
        let s = Sprite::new("car1", Vec2::ZERO).with_rotation(90.0);
        let world = s.relative_to_world(Vec2::new(0.0, -1.0));
        assert!((world.x - 1.0).abs() < 1e-4);
        assert!(world.y.abs() < 1e-4);
        let back = s.world_to_relative(world);
        assert!(back.x.abs() < 1e-4);
        assert!((back.y + 1.0).abs() < 1e-4);
    }
}
