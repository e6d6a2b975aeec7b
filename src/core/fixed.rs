//! Q16.16 Fixed-Point Arithmetic
//!
//! The platformer simulation runs entirely on integer math so that a level
//! replayed with the same inputs lands on the same pixel every time.
//!
//! ```text
//!   [S][IIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]
//!       15 integer bits   16 fraction bits
//!
//!   Range: -32768.0 .. +32767.99998   Precision: 1/65536
//! ```
//!
//! World coordinates are screen pixels (y grows downward), so the default
//! 600 x 800 world and velocities in the hundreds fit comfortably.

/// Q16.16 fixed-point number stored as i32.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1;

// =============================================================================
// GAME CONSTANTS
// =============================================================================

/// Frame duration: 1/60 second = round(65536/60) = 1092
pub const TICK_DURATION: Fixed = 1092;

/// Horizontal walking speed: 150 px/s
pub const PLAYER_SPEED: Fixed = 150 * FIXED_ONE;

/// Jump impulse: -600 px/s (upward, screen space)
pub const JUMP_SPEED: Fixed = -600 * FIXED_ONE;

/// Downward acceleration: 1000 px/s²
pub const GRAVITY: Fixed = 1000 * FIXED_ONE;

/// World width in pixels
pub const WORLD_WIDTH: Fixed = 600 * FIXED_ONE;

/// World height in pixels
pub const WORLD_HEIGHT: Fixed = 800 * FIXED_ONE;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert a float to fixed-point.
///
/// Only used at load time (level JSON, config). Never inside a tick.
///
/// ```
/// use monster_kong::core::fixed::{to_fixed, FIXED_ONE};
/// let half_tile = to_fixed(12.5);
/// assert_eq!(half_tile, FIXED_ONE * 12 + FIXED_ONE / 2);
/// ```
#[inline]
pub fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert an integer pixel count to fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Convert fixed-point to float for display.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Convert fixed-point to exact pixel coordinates for saving levels.
#[inline]
pub fn to_pixels(f: Fixed) -> f64 {
    f as f64 / FIXED_ONE as f64
}

/// Multiply two fixed-point numbers through an i64 intermediate.
///
/// Results outside the Q16.16 range saturate.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = ((a as i64) * (b as i64)) >> FIXED_SCALE;
    wide.clamp(Fixed::MIN as i64, Fixed::MAX as i64) as Fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(TICK_DURATION, 1092);
    }

    #[test]
    fn test_game_constants_match_pixels() {
        assert_eq!(to_float(PLAYER_SPEED), 150.0);
        assert_eq!(to_float(JUMP_SPEED), -600.0);
        assert_eq!(to_float(GRAVITY), 1000.0);
        assert_eq!(to_float(WORLD_WIDTH), 600.0);
        assert_eq!(to_float(WORLD_HEIGHT), 800.0);
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(0.5), FIXED_HALF);
        assert_eq!(to_fixed(-180.0), from_int(-180));
    }

    #[test]
    fn test_to_pixels_is_exact() {
        let odd = from_int(123) + 7;
        assert_eq!(to_fixed(to_pixels(odd)), odd);
        assert_eq!(to_pixels(from_int(-40)), -40.0);
    }

    #[test]
    fn test_fixed_mul_velocity_by_frame() {
        // 150 px/s over one frame is 2.5 px (truncated to fixed precision)
        let step = fixed_mul(PLAYER_SPEED, TICK_DURATION);
        assert!((to_float(step) - 2.5).abs() < 0.01);

        assert_eq!(fixed_mul(to_fixed(-2.0), to_fixed(3.0)), to_fixed(-6.0));
    }

    #[test]
    fn test_fixed_mul_saturates() {
        assert_eq!(fixed_mul(from_int(30000), from_int(2)), Fixed::MAX);
        assert_eq!(fixed_mul(from_int(-30000), from_int(2)), Fixed::MIN);
    }
}
