//! Texture Metadata
//!
//! The asset loader owns the images; the level builder only needs their
//! native dimensions to size sprites and tiled platforms.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::vec2::FixedVec2;

/// Native dimensions of a loaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureInfo {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Frame size for spritesheets; `None` for plain images
    #[serde(default)]
    pub frame: Option<(u32, u32)>,
}

impl TextureInfo {
    /// Plain image.
    pub const fn image(width: u32, height: u32) -> Self {
        Self { width, height, frame: None }
    }

    /// Spritesheet with a fixed frame size. The sheet size is unknown to the
    /// builder, so frame dimensions stand in for it.
    pub const fn spritesheet(frame_width: u32, frame_height: u32) -> Self {
        Self {
            width: frame_width,
            height: frame_height,
            frame: Some((frame_width, frame_height)),
        }
    }

    /// Size of one tile or frame: the unit a sprite is drawn at.
    pub fn tile_size(&self) -> FixedVec2 {
        let (w, h) = self.frame.unwrap_or((self.width, self.height));
        FixedVec2::from_ints(w as i32, h as i32)
    }
}

/// Texture keys the level builder depends on besides platform keys.
pub mod keys {
    /// Player spritesheet
    pub const PLAYER: &str = "player";
    /// Fire (hazard) spritesheet
    pub const FIRE: &str = "fire";
    /// Goal image
    pub const GOAL: &str = "goal";
}

/// Key → dimensions lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextureRegistry {
    textures: BTreeMap<String, TextureInfo>,
}

impl TextureRegistry {
    /// Empty registry.
    pub fn empty() -> Self {
        Self { textures: BTreeMap::new() }
    }

    /// Registry with the shipped Monster Kong assets.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("ground", TextureInfo::image(360, 30));
        registry.register("platform", TextureInfo::image(36, 12));
        registry.register("block", TextureInfo::image(36, 30));
        registry.register("barrel", TextureInfo::image(24, 24));
        registry.register(keys::GOAL, TextureInfo::image(38, 46));
        registry.register(keys::PLAYER, TextureInfo::spritesheet(28, 30));
        registry.register(keys::FIRE, TextureInfo::spritesheet(20, 21));
        registry
    }

    /// Parse a `{ "key": {"width": .., "height": .., "frame": [w, h]} }`
    /// manifest and layer it over the built-in textures.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let overrides: BTreeMap<String, TextureInfo> = serde_json::from_str(json)?;
        let mut registry = Self::builtin();
        for (key, info) in overrides {
            registry.register(key, info);
        }
        Ok(registry)
    }

    /// Add or replace a texture.
    pub fn register(&mut self, key: impl Into<String>, info: TextureInfo) {
        self.textures.insert(key.into(), info);
    }

    /// Look up a texture.
    pub fn get(&self, key: &str) -> Option<&TextureInfo> {
        self.textures.get(key)
    }

    /// Whether a key is known.
    pub fn contains(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
