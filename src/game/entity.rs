//! World Entities
//!
//! Everything the level builder places: platforms, hazards, the player and
//! the goal. Entities are owned by the world; the controller refers to the
//! player only by id.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::hash::StateHasher;
use crate::core::vec2::FixedVec2;
use crate::game::animation::AnimationPlayer;
use crate::game::collision::Aabb;

/// Stable entity identifier, assigned in build order.
pub type EntityId = u32;

/// What an entity is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityKind {
    /// Static ground the player stands on
    Platform = 0,
    /// Fire; touching it is fatal
    Hazard = 1,
    /// The controlled character
    Player = 2,
    /// Level exit
    Goal = 3,
}

/// Which point of the sprite `position` refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Top-left corner (platforms, fires)
    TopLeft,
    /// Centre (player, goal)
    Center,
}

/// Static bodies never move; dynamic ones integrate velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// Direction the player sprite faces.
///
/// The spritesheet is drawn facing left, so facing right means the sprite
/// is mirrored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    #[default]
    Left = 0,
    Right = 1,
}

impl Facing {
    /// Whether the renderer should mirror the sprite.
    #[inline]
    pub fn flip_x(self) -> bool {
        self == Facing::Right
    }
}

/// Support from below, as reported by the physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contact {
    /// Motion was stopped by something below (static body or world edge)
    pub blocked_down: bool,
    /// Overlap resolution found a body directly below
    pub touching_down: bool,
}

impl Contact {
    /// Either kind of support counts as standing.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.blocked_down || self.touching_down
    }
}

/// Collision body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Body {
    /// Static or dynamic
    pub kind: BodyKind,
    /// Velocity in px/s
    pub velocity: FixedVec2,
    /// Receives world gravity
    pub allow_gravity: bool,
    /// Not pushed by collisions
    pub immovable: bool,
    /// Clamped to the world rectangle
    pub collide_world_bounds: bool,
    /// Contact flags from the last physics step
    pub contact: Contact,
}

impl Body {
    /// Body for platforms.
    pub const fn fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            velocity: FixedVec2::ZERO,
            allow_gravity: false,
            immovable: true,
            collide_world_bounds: false,
            contact: Contact { blocked_down: false, touching_down: false },
        }
    }

    /// Gravity-driven body.
    pub const fn dynamic() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            velocity: FixedVec2::ZERO,
            allow_gravity: true,
            immovable: false,
            collide_world_bounds: false,
            contact: Contact { blocked_down: false, touching_down: false },
        }
    }

    /// Dynamic body that ignores gravity and collisions (fires).
    pub const fn floating() -> Self {
        let mut body = Self::dynamic();
        body.allow_gravity = false;
        body.immovable = true;
        body
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }
}

/// A positioned object in the world.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Stable id
    pub id: EntityId,
    /// Platform, hazard, player or goal
    pub kind: EntityKind,
    /// Texture key
    pub texture: String,
    /// Anchor point (see `origin`)
    pub position: FixedVec2,
    /// Full width and height
    pub size: FixedVec2,
    /// Anchor convention
    pub origin: Origin,
    /// Tile count for platforms (1 = plain sprite), 1 otherwise
    pub tiles: u32,
    /// Collision body
    pub body: Body,
    /// Frame animation playback
    pub animation: AnimationPlayer,
    /// Spritesheet frame currently shown
    pub frame: u16,
    /// Sprite facing
    pub facing: Facing,
    /// Can be moved with the pointer (edit mode only)
    pub draggable: bool,
}

impl Entity {
    /// Axis-aligned bounds.
    pub fn bounds(&self) -> Aabb {
        let min = match self.origin {
            Origin::TopLeft => self.position,
            Origin::Center => self.position.sub(self.size.half()),
        };
        Aabb::new(min, min.add(self.size))
    }

    /// Move so that the top-left corner of the bounds is at `min`.
    pub fn set_bounds_min(&mut self, min: FixedVec2) {
        self.position = match self.origin {
            Origin::TopLeft => min,
            Origin::Center => min.add(self.size.half()),
        };
    }

    /// Shift by an offset.
    #[inline]
    pub fn translate(&mut self, offset: FixedVec2) {
        self.position = self.position.add(offset);
    }

    /// Width in pixels (fixed-point).
    #[inline]
    pub fn width(&self) -> Fixed {
        self.size.x
    }

    /// Hash this entity's observable state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id);
        hasher.update_u8(self.kind as u8);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.body.velocity);
        hasher.update_bool(self.body.contact.is_grounded());
        hasher.update_u16(self.frame);
        hasher.update_u8(self.facing as u8);
    }
}
