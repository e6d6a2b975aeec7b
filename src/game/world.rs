//! World Simulation
//!
//! Owns the level's entities and advances them one frame per `update` call
//! from the host loop. Frame order is fixed:
//!
//! 1. integrate physics and resolve platform collisions
//! 2. run the player controller and apply its commands
//! 3. advance frame animations
//! 4. report new player overlaps (fire, goal)
//!
//! Iteration is over `BTreeMap`s and all math is fixed-point, so the same
//! level and inputs always produce the same state hash.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::core::fixed::{to_pixels, Fixed, TICK_DURATION};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::vec2::FixedVec2;
use crate::game::animation::AnimationLibrary;
use crate::game::collision::{check_overlaps, Collider, OverlapWatch};
use crate::game::controller::{PlayerAnimState, PlayerController, PlayerState};
use crate::game::entity::{Entity, EntityId};
use crate::game::events::{sort_events, GameEvent};
use crate::game::input::{InputRecording, InputSnapshot};
use crate::game::level::{
    HazardSpec, LevelBuilder, LevelDescription, LevelError, PlatformSpec, Point,
};
use crate::game::physics::{ArcadePhysics, Physics};
use crate::game::textures::TextureRegistry;

/// Errors from world operations after the level is built.
#[derive(Debug, Error)]
pub enum WorldError {
    /// No entity has this id.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    /// The entity exists but cannot be dragged.
    #[error("entity {0} is not draggable")]
    NotDraggable(EntityId),
    /// Authoring operations need edit mode.
    #[error("world is not in edit mode")]
    NotEditMode,
}

/// Result of one frame.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick that was just simulated
    pub tick: u32,
    /// Events raised this frame, in processing order
    pub events: Vec<GameEvent>,
    /// The player started touching a fire
    pub hazard_touched: bool,
    /// The player started touching the goal
    pub goal_reached: bool,
}

/// A running level.
pub struct World<P: Physics = ArcadePhysics> {
    config: GameConfig,
    tick: u32,

    /// All entities (BTreeMap for deterministic iteration)
    entities: BTreeMap<EntityId, Entity>,
    platform_ids: Vec<EntityId>,
    hazard_ids: Vec<EntityId>,
    player_id: EntityId,
    goal_id: EntityId,
    player_start: FixedVec2,
    goal_start: FixedVec2,

    colliders: Vec<Collider>,
    overlaps: Vec<OverlapWatch>,
    /// Ids the player overlapped last frame, so events fire on entry only
    touching: BTreeSet<EntityId>,

    physics: P,
    controller: PlayerController,
    animations: AnimationLibrary,

    /// Events raised outside `update` (drags), drained by the next update
    pending_events: Vec<GameEvent>,
}

impl World {
    /// Build a level with the built-in arcade physics.
    pub fn new(
        desc: &LevelDescription,
        textures: &TextureRegistry,
        config: GameConfig,
    ) -> Result<Self, LevelError> {
        let physics = ArcadePhysics::new(&config);
        World::with_physics(desc, textures, config, physics)
    }

    /// Parse a level document and build it.
    pub fn from_json_str(
        json: &str,
        textures: &TextureRegistry,
        config: GameConfig,
    ) -> Result<Self, LevelError> {
        let desc = LevelDescription::from_json_str(json)?;
        Self::new(&desc, textures, config)
    }
}

impl<P: Physics> World<P> {
    /// Build a level driven by a custom physics engine.
    pub fn with_physics(
        desc: &LevelDescription,
        textures: &TextureRegistry,
        config: GameConfig,
        physics: P,
    ) -> Result<Self, LevelError> {
        let animations = AnimationLibrary::standard();
        let level = LevelBuilder::new(textures, &animations, &config).build(desc)?;

        let platform_ids = level.platforms.iter().map(|e| e.id).collect();
        let hazard_ids = level.hazards.iter().map(|e| e.id).collect();
        let player_id = level.player.id;
        let goal_id = level.goal.id;
        let player_start = level.player.position;
        let goal_start = level.goal.position;

        let entities = level
            .platforms
            .into_iter()
            .chain(level.hazards)
            .chain([level.player, level.goal])
            .map(|e| (e.id, e))
            .collect();

        Ok(Self {
            controller: PlayerController::new(&config),
            config,
            tick: 0,
            entities,
            platform_ids,
            hazard_ids,
            player_id,
            goal_id,
            player_start,
            goal_start,
            colliders: level.colliders,
            overlaps: level.overlaps,
            touching: BTreeSet::new(),
            physics,
            animations,
            pending_events: Vec::new(),
        })
    }

    /// Advance one frame of `dt` fixed-point seconds.
    pub fn update(&mut self, input: InputSnapshot, dt: Fixed) -> TickResult {
        self.tick += 1;
        let mut events = std::mem::take(&mut self.pending_events);

        // 1. Physics
        self.physics.step(&mut self.entities, &self.colliders, dt);

        // 2. Controller
        if let Some(player) = self.entities.get_mut(&self.player_id) {
            let commands = self.controller.tick(input, player.body.contact);
            commands.apply(player, &self.animations);

            if commands.velocity_y.is_some() {
                debug!(tick = self.tick, position = %player.position, "player jumped");
                events.push(GameEvent::player_jumped(self.tick, player.position));
            }
        }

        // 3. Animations
        for entity in self.entities.values_mut() {
            if let Some(frame) = entity.animation.advance(dt) {
                entity.frame = frame;
            }
        }

        // 4. Overlaps
        let mut result = TickResult {
            tick: self.tick,
            ..Default::default()
        };
        let now: BTreeSet<EntityId> = check_overlaps(&self.entities, &self.overlaps)
            .into_iter()
            .filter(|(body, _)| *body == self.player_id)
            .map(|(_, other)| other)
            .collect();

        let position = self.player_position();
        for other in now.difference(&self.touching) {
            if *other == self.goal_id {
                info!(tick = self.tick, %position, "goal reached");
                result.goal_reached = true;
                events.push(GameEvent::goal_reached(self.tick, position));
            } else {
                info!(tick = self.tick, hazard = *other, %position, "hazard touched");
                result.hazard_touched = true;
                events.push(GameEvent::hazard_touched(self.tick, *other, position));
            }
        }
        self.touching = now;

        sort_events(&mut events);
        result.events = events;
        result
    }

    /// Move a draggable entity to `position` (its origin point).
    pub fn drag_entity(&mut self, id: EntityId, position: FixedVec2) -> Result<(), WorldError> {
        if !self.config.is_edit_mode() {
            return Err(WorldError::NotEditMode);
        }
        let entity = self.entities.get_mut(&id).ok_or(WorldError::UnknownEntity(id))?;
        if !entity.draggable {
            return Err(WorldError::NotDraggable(id));
        }

        entity.position = position;
        info!(id, x = to_pixels(position.x), y = to_pixels(position.y), "entity dragged");
        self.pending_events.push(GameEvent::entity_dragged(self.tick, id, position));
        Ok(())
    }

    /// Level document for the current placements. Player and goal are saved
    /// at their start positions, not where play has moved them.
    pub fn export_level(&self) -> LevelDescription {
        let platforms = self
            .platforms()
            .map(|p| PlatformSpec {
                x: to_pixels(p.position.x),
                y: to_pixels(p.position.y),
                key: p.texture.clone(),
                num_tiles: p.tiles,
            })
            .collect();
        let hazards = self
            .hazards()
            .map(|h| HazardSpec {
                x: to_pixels(h.position.x),
                y: to_pixels(h.position.y),
            })
            .collect();

        LevelDescription {
            platforms,
            hazards,
            player: Some(point(self.player_start)),
            goal: Some(point(self.goal_start)),
        }
    }

    /// Hash of the simulated state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            for entity in self.entities.values() {
                entity.hash_into(hasher);
            }
        })
    }

    /// Player snapshot after the last frame.
    pub fn player_state(&self) -> PlayerState {
        match self.player() {
            Some(player) => PlayerState {
                facing: player.facing,
                velocity_x: player.body.velocity.x,
                velocity_y: player.body.velocity.y,
                animation: self.controller.state(),
                grounded: player.body.contact.is_grounded(),
            },
            None => PlayerState {
                facing: Default::default(),
                velocity_x: 0,
                velocity_y: 0,
                animation: PlayerAnimState::Idle,
                grounded: false,
            },
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Frames simulated so far.
    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// All entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn platforms(&self) -> impl Iterator<Item = &Entity> {
        self.platform_ids.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn hazards(&self) -> impl Iterator<Item = &Entity> {
        self.hazard_ids.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.get(&self.player_id)
    }

    pub fn goal(&self) -> Option<&Entity> {
        self.entities.get(&self.goal_id)
    }

    #[inline]
    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    #[inline]
    pub fn goal_id(&self) -> EntityId {
        self.goal_id
    }

    fn player_position(&self) -> FixedVec2 {
        self.player().map(|p| p.position).unwrap_or(FixedVec2::ZERO)
    }
}

fn point(v: FixedVec2) -> Point {
    Point {
        x: to_pixels(v.x),
        y: to_pixels(v.y),
    }
}

/// Rebuild a level and run a recording through it at the standard frame
/// rate.
///
/// Returns the final world and every event raised.
pub fn replay_level(
    desc: &LevelDescription,
    textures: &TextureRegistry,
    config: GameConfig,
    recording: &InputRecording,
) -> Result<(World, Vec<GameEvent>), LevelError> {
    let mut world = World::new(desc, textures, config)?;
    let mut all_events = Vec::new();

    for (_, input) in recording.replay_iter() {
        let result = world.update(input, TICK_DURATION);
        all_events.extend(result.events);
    }

    Ok((world, all_events))
}
