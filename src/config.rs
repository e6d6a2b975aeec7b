//! World configuration.
//!
//! Read once at setup and shared by the level builder, the physics engine
//! and the player controller. Values are pixels in JSON and fixed-point in
//! memory.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::fixed::{
    Fixed, GRAVITY, JUMP_SPEED, PLAYER_SPEED, WORLD_HEIGHT, WORLD_WIDTH,
};

/// Whether the world runs as a game or as a level-authoring session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Normal play: hazards are fixed in place.
    #[default]
    Play,
    /// Authoring: hazards can be dragged and the level exported.
    Edit,
}

/// Configuration for a world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// World width (right clamp for bounded bodies)
    #[serde(with = "pixels")]
    pub world_width: Fixed,
    /// World height (bottom clamp for bounded bodies)
    #[serde(with = "pixels")]
    pub world_height: Fixed,
    /// Downward acceleration applied to gravity-enabled bodies
    #[serde(with = "pixels")]
    pub gravity: Fixed,
    /// Horizontal speed while a direction is held
    #[serde(with = "pixels")]
    pub player_speed: Fixed,
    /// Vertical impulse on jump (negative is up)
    #[serde(with = "pixels")]
    pub jump_speed: Fixed,
    /// Play or edit mode
    pub mode: PlayMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            gravity: GRAVITY,
            player_speed: PLAYER_SPEED,
            jump_speed: JUMP_SPEED,
            mode: PlayMode::Play,
        }
    }
}

impl GameConfig {
    /// Parse a configuration document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Same configuration in edit mode.
    pub fn with_mode(mut self, mode: PlayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether authoring features are enabled.
    #[inline]
    pub fn is_edit_mode(&self) -> bool {
        self.mode == PlayMode::Edit
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid configuration JSON.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serde adapter: float pixels on the wire, Q16.16 in memory.
pub(crate) mod pixels {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::core::fixed::{to_fixed, to_float, Fixed};

    /// Largest magnitude representable in Q16.16.
    const LIMIT: f64 = 32767.0;

    pub fn serialize<S: Serializer>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_float(*value) as f64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() || value.abs() > LIMIT {
            return Err(D::Error::custom(format!("{} is out of range", value)));
        }
        Ok(to_fixed(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;

    #[test]
    fn test_default_tuning() {
        let config = GameConfig::default();
        assert_eq!(config.player_speed, from_int(150));
        assert_eq!(config.jump_speed, from_int(-600));
        assert_eq!(config.gravity, from_int(1000));
        assert_eq!(config.world_width, from_int(600));
        assert_eq!(config.world_height, from_int(800));
        assert_eq!(config.mode, PlayMode::Play);
        assert!(!config.is_edit_mode());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{"player_speed": 200, "mode": "edit"}"#).unwrap();
        assert_eq!(config.player_speed, from_int(200));
        assert_eq!(config.gravity, GRAVITY);
        assert!(config.is_edit_mode());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(GameConfig::from_json_str("{\"gravity\": \"lots\"}").is_err());
        assert!(GameConfig::from_json_str("{\"world_width\": 1e9}").is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = GameConfig::default().with_mode(PlayMode::Edit);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_json_str(&json).unwrap(), config);
    }
}
