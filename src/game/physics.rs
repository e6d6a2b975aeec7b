//! Arcade Physics
//!
//! The engine side of the frame: gravity, integration, separation from
//! static platforms and world-bounds clamping. The controller never touches
//! positions; it only sets velocities that the next step integrates.

use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::core::fixed::{fixed_mul, Fixed};
use crate::core::vec2::FixedVec2;
use crate::game::collision::{separation, Aabb, Collider, Separation};
use crate::game::entity::{Contact, Entity, EntityId};

/// Physics engine used by the world.
pub trait Physics {
    /// Integrate every dynamic body by `dt` and resolve `colliders`.
    ///
    /// Afterwards each dynamic body's `contact` reflects support found
    /// during this step only.
    fn step(
        &mut self,
        entities: &mut BTreeMap<EntityId, Entity>,
        colliders: &[Collider],
        dt: Fixed,
    );
}

/// Simple arcade physics: boxes, gravity, no rotation, no restitution.
#[derive(Clone, Debug)]
pub struct ArcadePhysics {
    gravity: Fixed,
    bounds: Aabb,
}

impl ArcadePhysics {
    /// Physics for a world of the given size and gravity.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            gravity: config.gravity,
            bounds: Aabb::new(
                FixedVec2::ZERO,
                FixedVec2::new(config.world_width, config.world_height),
            ),
        }
    }

    fn integrate(&self, entity: &mut Entity, dt: Fixed) {
        let body = &mut entity.body;
        body.contact = Contact::default();

        if body.allow_gravity {
            body.velocity.y = body.velocity.y.saturating_add(fixed_mul(self.gravity, dt));
        }

        let offset = body.velocity.scale(dt);
        entity.translate(offset);
    }

    fn resolve(&self, entity: &mut Entity, previous: &Aabb, fixed: &Aabb) {
        let current = entity.bounds();
        if !current.overlaps(fixed) {
            return;
        }

        let mut min = current.min;
        match separation(previous, &current, fixed) {
            Separation::Up => {
                min.y = fixed.min.y - current.height();
                if entity.body.velocity.y > 0 {
                    entity.body.velocity.y = 0;
                }
                entity.body.contact.blocked_down = true;
                entity.body.contact.touching_down = true;
            }
            Separation::Down => {
                min.y = fixed.max.y;
                if entity.body.velocity.y < 0 {
                    entity.body.velocity.y = 0;
                }
            }
            Separation::Left => {
                min.x = fixed.min.x - current.width();
                entity.body.velocity.x = 0;
            }
            Separation::Right => {
                min.x = fixed.max.x;
                entity.body.velocity.x = 0;
            }
        }
        entity.set_bounds_min(min);
    }

    fn clamp_to_world(&self, entity: &mut Entity) {
        let current = entity.bounds();
        let mut min = current.min;
        let body = &mut entity.body;

        if current.min.x < self.bounds.min.x {
            min.x = self.bounds.min.x;
            body.velocity.x = 0;
        } else if current.max.x > self.bounds.max.x {
            min.x = self.bounds.max.x - current.width();
            body.velocity.x = 0;
        }

        if current.min.y < self.bounds.min.y {
            min.y = self.bounds.min.y;
            body.velocity.y = body.velocity.y.max(0);
        } else if current.max.y >= self.bounds.max.y {
            min.y = self.bounds.max.y - current.height();
            body.velocity.y = body.velocity.y.min(0);
            body.contact.blocked_down = true;
        }

        if min != current.min {
            entity.set_bounds_min(min);
        }
    }
}

impl Physics for ArcadePhysics {
    fn step(
        &mut self,
        entities: &mut BTreeMap<EntityId, Entity>,
        colliders: &[Collider],
        dt: Fixed,
    ) {
        // 1. Integrate (BTreeMap order)
        let mut previous: BTreeMap<EntityId, Aabb> = BTreeMap::new();
        for (id, entity) in entities.iter_mut() {
            if entity.body.is_static() {
                continue;
            }
            previous.insert(*id, entity.bounds());
            self.integrate(entity, dt);
        }

        // 2. Separate registered pairs, platforms in registration order
        for collider in colliders {
            let Some(before) = previous.get(&collider.body).copied() else {
                continue;
            };
            let statics: Vec<Aabb> = collider
                .against
                .iter()
                .filter_map(|id| entities.get(id))
                .filter(|other| other.body.is_static())
                .map(Entity::bounds)
                .collect();

            if let Some(entity) = entities.get_mut(&collider.body) {
                for fixed in &statics {
                    self.resolve(entity, &before, fixed);
                }
            }
        }

        // 3. World bounds
        for id in previous.keys() {
            if let Some(entity) = entities.get_mut(id) {
                if entity.body.collide_world_bounds {
                    self.clamp_to_world(entity);
                }
            }
        }
    }
}
