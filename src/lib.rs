//! # Monster Kong
//!
//! Deterministic core for a small 2D platformer: the player runs and jumps
//! across static platforms, avoids fires, and reaches the goal.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       MONSTER KONG                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── fixed.rs     - Q16.16 fixed-point arithmetic            │
//! │  ├── vec2.rs      - 2D vector with fixed-point               │
//! │  └── hash.rs      - State hashing for replay checks          │
//! │                                                              │
//! │  config.rs        - World configuration, play/edit mode      │
//! │                                                              │
//! │  game/            - Game logic (deterministic)               │
//! │  ├── level.rs     - Level description → entities             │
//! │  ├── controller.rs- Player movement/animation state machine  │
//! │  ├── world.rs     - Entity ownership, per-frame update       │
//! │  ├── physics.rs   - Arcade physics                           │
//! │  ├── collision.rs - AABB tests                               │
//! │  ├── animation.rs - Frame animations                         │
//! │  ├── textures.rs  - Texture dimensions                       │
//! │  ├── input.rs     - Input snapshots and recordings           │
//! │  └── events.rs    - Events for the host loop                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Order
//!
//! Each `World::update` integrates physics, resolves platform collisions,
//! runs the player controller, advances animations and reports overlaps.
//! The controller only writes velocities; the next physics step moves the
//! player.
//!
//! ## Determinism
//!
//! - No floating-point arithmetic inside a frame (floats only at load time)
//! - BTreeMap for entity iteration
//! - No system time dependencies
//!
//! Identical levels and input recordings produce identical state hashes.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::config::{GameConfig, PlayMode};
pub use crate::core::fixed::{Fixed, FIXED_HALF, FIXED_ONE, FIXED_SCALE, TICK_DURATION};
pub use crate::core::vec2::FixedVec2;
pub use crate::game::input::{InputRecording, InputSnapshot};
pub use crate::game::level::{LevelDescription, LevelError};
pub use crate::game::world::{World, WorldError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
