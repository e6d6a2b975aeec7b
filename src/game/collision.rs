//! Collision Detection
//!
//! Axis-aligned box tests plus the collider and overlap registrations the
//! level builder hands to the physics engine.

use std::collections::BTreeMap;

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::game::entity::{Entity, EntityId};

/// Axis-aligned bounding box in screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb {
    /// Top-left corner
    pub min: FixedVec2,
    /// Bottom-right corner
    pub max: FixedVec2,
}

impl Aabb {
    #[inline]
    pub const fn new(min: FixedVec2, max: FixedVec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> Fixed {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> Fixed {
        self.max.y - self.min.y
    }

    /// Boxes share interior area. Touching edges do not count, so a body
    /// resting exactly on a platform is not overlapping it.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Which way a body was pushed out of a static box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Separation {
    /// Landed on top
    Up,
    /// Hit its head on the underside
    Down,
    /// Pushed left (hit the static box's left side)
    Left,
    /// Pushed right
    Right,
}

/// Decide how to separate `moving` from `fixed`, given where `moving` was
/// before this frame's integration.
///
/// A body that was entirely above the box lands on it; entirely below bonks;
/// entirely beside is stopped horizontally. A body that was already
/// penetrating is pushed out along the axis of least overlap.
pub fn separation(previous: &Aabb, moving: &Aabb, fixed: &Aabb) -> Separation {
    if previous.max.y <= fixed.min.y {
        return Separation::Up;
    }
    if previous.min.y >= fixed.max.y {
        return Separation::Down;
    }
    if previous.max.x <= fixed.min.x {
        return Separation::Left;
    }
    if previous.min.x >= fixed.max.x {
        return Separation::Right;
    }

    let push_up = moving.max.y - fixed.min.y;
    let push_down = fixed.max.y - moving.min.y;
    let push_left = moving.max.x - fixed.min.x;
    let push_right = fixed.max.x - moving.min.x;

    let vertical = push_up.min(push_down);
    let horizontal = push_left.min(push_right);
    if vertical <= horizontal {
        if push_up <= push_down { Separation::Up } else { Separation::Down }
    } else if push_left <= push_right {
        Separation::Left
    } else {
        Separation::Right
    }
}

/// A dynamic body that collides with a set of static bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collider {
    /// The moving body
    pub body: EntityId,
    /// Static bodies it is separated from
    pub against: Vec<EntityId>,
}

/// A body whose overlaps with a set of others are reported, not resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlapWatch {
    /// The watched body
    pub body: EntityId,
    /// Bodies that trigger a report
    pub against: Vec<EntityId>,
}

/// Every `(body, other)` pair currently overlapping, in registration order.
pub fn check_overlaps(
    entities: &BTreeMap<EntityId, Entity>,
    watches: &[OverlapWatch],
) -> Vec<(EntityId, EntityId)> {
    let mut hits = Vec::new();

    for watch in watches {
        let Some(body) = entities.get(&watch.body) else {
            continue;
        };
        let bounds = body.bounds();

        for other_id in &watch.against {
            if let Some(other) = entities.get(other_id) {
                if bounds.overlaps(&other.bounds()) {
                    hits.push((watch.body, *other_id));
                }
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x: i32, y: i32, w: i32, h: i32) -> Aabb {
        let min = FixedVec2::from_ints(x, y);
        Aabb::new(min, min.add(FixedVec2::from_ints(w, h)))
    }

    #[test]
    fn test_overlap_excludes_touching_edges() {
        let platform = boxed(0, 100, 100, 20);
        let resting = boxed(10, 70, 28, 30);
        let sunk = boxed(10, 71, 28, 30);
        let beside = boxed(100, 100, 10, 10);

        assert!(!resting.overlaps(&platform));
        assert!(sunk.overlaps(&platform));
        assert!(!beside.overlaps(&platform));
    }

    #[test]
    fn test_separation_landing() {
        let platform = boxed(0, 100, 100, 20);
        let before = boxed(10, 65, 28, 30);
        let after = boxed(10, 75, 28, 30);
        assert_eq!(separation(&before, &after, &platform), Separation::Up);
    }

    #[test]
    fn test_separation_head_bonk() {
        let platform = boxed(0, 100, 100, 20);
        let before = boxed(10, 125, 28, 30);
        let after = boxed(10, 115, 28, 30);
        assert_eq!(separation(&before, &after, &platform), Separation::Down);
    }

    #[test]
    fn test_separation_side() {
        let wall = boxed(100, 0, 20, 200);
        let before = boxed(70, 50, 28, 30);
        let after = boxed(75, 50, 28, 30);
        assert_eq!(separation(&before, &after, &wall), Separation::Left);

        let before = boxed(121, 50, 28, 30);
        let after = boxed(118, 50, 28, 30);
        assert_eq!(separation(&before, &after, &wall), Separation::Right);
    }

    #[test]
    fn test_separation_embedded_uses_least_overlap() {
        let platform = boxed(0, 100, 200, 20);
        // Already 4px into the top surface, far from either side.
        let embedded = boxed(80, 74, 28, 30);
        assert_eq!(separation(&embedded, &embedded, &platform), Separation::Up);
    }
}
