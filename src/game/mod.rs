//! Game Logic Module
//!
//! Level building, player control and the engine collaborators they drive.
//! Deterministic given the same level and inputs.
//!
//! ## Module Structure
//!
//! - `level`: Level description and builder
//! - `controller`: Player state machine
//! - `world`: Entity ownership and the per-frame update
//! - `entity`: Entities, bodies, contact flags
//! - `physics`: Arcade physics (gravity, platform separation, bounds)
//! - `collision`: AABB tests and collision registrations
//! - `animation`: Frame animations
//! - `textures`: Texture dimensions for sprite sizing
//! - `input`: Input snapshots, recording and replay
//! - `events`: Game events for the host loop

pub mod animation;
pub mod collision;
pub mod controller;
pub mod entity;
pub mod events;
pub mod input;
pub mod level;
pub mod physics;
pub mod textures;
pub mod world;

// Re-export key types
pub use controller::{PlayerAnimState, PlayerCommands, PlayerController, PlayerState};
pub use entity::{Entity, EntityId, EntityKind};
pub use events::{GameEvent, GameEventData};
pub use input::{InputRecording, InputSnapshot};
pub use level::{build_level, LevelDescription, LevelEntities, LevelError};
pub use world::{replay_level, TickResult, World, WorldError};
