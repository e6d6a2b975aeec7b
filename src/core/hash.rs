//! State Hashing for Replay Verification
//!
//! A world replayed from the same level and the same input recording must
//! hash to the same value.

use sha2::{Sha256, Digest};
use super::fixed::Fixed;
use super::vec2::FixedVec2;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for world state.
///
/// Wraps SHA-256 with helpers for fixed-point types.
/// Order of updates is part of the hash.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for world state.
    pub fn for_world_state() -> Self {
        Self::new(b"MONSTER_KONG_WORLD_V1")
    }

    /// Create hasher for an input recording.
    pub fn for_input_recording() -> Self {
        Self::new(b"MONSTER_KONG_INPUTS_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u16 value (little-endian).
    #[inline]
    pub fn update_u16(&mut self, value: u16) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a Fixed value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a FixedVec2.
    #[inline]
    pub fn update_vec2(&mut self, value: FixedVec2) {
        self.update_fixed(value.x);
        self.update_fixed(value.y);
    }

    /// Update with a bool.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.hasher.update([value as u8]);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute the world state hash.
///
/// The tick is always hashed first; `add_state` appends entity data.
pub fn compute_state_hash<F>(tick: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_world_state();
    hasher.update_u32(tick);
    add_state(&mut hasher);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let a = compute_state_hash(7, |h| h.update_vec2(FixedVec2::from_ints(1, 2)));
        let b = compute_state_hash(7, |h| h.update_vec2(FixedVec2::from_ints(1, 2)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_sensitive_to_tick_and_order() {
        let base = compute_state_hash(1, |h| {
            h.update_u8(1);
            h.update_u8(2);
        });
        let other_tick = compute_state_hash(2, |h| {
            h.update_u8(1);
            h.update_u8(2);
        });
        let swapped = compute_state_hash(1, |h| {
            h.update_u8(2);
            h.update_u8(1);
        });
        assert_ne!(base, other_tick);
        assert_ne!(base, swapped);
    }

    #[test]
    fn test_domains_differ() {
        let world = StateHasher::for_world_state().finalize();
        let inputs = StateHasher::for_input_recording().finalize();
        assert_ne!(world, inputs);
    }
}
