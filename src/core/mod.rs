//! Core deterministic primitives.
//!
//! Fixed-point scalars and vectors plus state hashing. Nothing here knows
//! about platforms or players.

pub mod fixed;
pub mod vec2;
pub mod hash;

pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use hash::{compute_state_hash, StateHash, StateHasher};
