//! Level Description and Builder
//!
//! Turns the declarative level document into positioned, collidable
//! entities. Loading is all-or-nothing: any malformed entry rejects the
//! whole level.
//!
//! ```json
//! {
//!   "platforms": [{"x": 180, "y": 400, "key": "ground", "numTiles": 1}],
//!   "fires": [{"x": 40, "y": 370}],
//!   "player": {"x": 180, "y": 250},
//!   "goal": {"x": 400, "y": 100}
//! }
//! ```

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::core::fixed::{to_fixed, Fixed};
use crate::core::vec2::FixedVec2;
use crate::game::animation::{AnimationLibrary, BURNING};
use crate::game::collision::{Collider, OverlapWatch};
use crate::game::controller::IDLE_FRAME;
use crate::game::entity::{Body, Entity, EntityId, EntityKind, Facing, Origin};
use crate::game::textures::{keys, TextureRegistry};

/// Largest coordinate magnitude the fixed-point world can hold.
const COORDINATE_LIMIT: f64 = 32767.0;

// =============================================================================
// DESCRIPTION
// =============================================================================

/// A point in level space (pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One platform placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Texture key
    pub key: String,
    /// Horizontal repetitions of the texture
    #[serde(rename = "numTiles")]
    pub num_tiles: u32,
}

/// One fire placement (top-left corner).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardSpec {
    pub x: f64,
    pub y: f64,
}

/// Declarative level data, as loaded from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Platforms in placement order
    #[serde(default)]
    pub platforms: Vec<PlatformSpec>,
    /// Fires in placement order
    #[serde(default, rename = "fires")]
    pub hazards: Vec<HazardSpec>,
    /// Player start (centre of the sprite)
    pub player: Option<Point>,
    /// Goal position (centre of the sprite)
    pub goal: Option<Point>,
}

impl LevelDescription {
    /// Parse a level document.
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to the level document format.
    pub fn to_json_string(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Malformed level errors.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The document has no player start.
    #[error("level has no player start")]
    MissingPlayerStart,
    /// The document has no goal position.
    #[error("level has no goal position")]
    MissingGoal,
    /// An entity references a texture the asset loader did not provide.
    #[error("unknown texture key '{key}' ({context})")]
    UnknownTexture { key: String, context: String },
    /// A platform has zero tiles.
    #[error("platform {index} has zero tiles")]
    ZeroTiles { index: usize },
    /// A platform's far edge is past the fixed-point range.
    #[error("platform {index} does not fit in world coordinates ({tiles} tiles)")]
    PlatformTooWide { index: usize, tiles: u32 },
    /// A coordinate is NaN, infinite, or out of range.
    #[error("invalid coordinate for {context}: {value}")]
    InvalidCoordinate { context: String, value: f64 },
    /// A required animation is not defined.
    #[error("unknown animation '{0}'")]
    UnknownAnimation(String),
    /// The document is not valid level JSON.
    #[error("invalid level document: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// BUILDER
// =============================================================================

/// Entities produced for one level, plus the collision registrations the
/// physics engine needs.
#[derive(Clone, Debug)]
pub struct LevelEntities {
    /// Static platforms, in description order
    pub platforms: Vec<Entity>,
    /// Fires, in description order
    pub hazards: Vec<Entity>,
    /// The player
    pub player: Entity,
    /// The goal
    pub goal: Entity,
    /// Player and goal both collide with every platform
    pub colliders: Vec<Collider>,
    /// Player overlaps with fires and goal are reported
    pub overlaps: Vec<OverlapWatch>,
}

/// Builds levels against a set of loaded assets.
pub struct LevelBuilder<'a> {
    textures: &'a TextureRegistry,
    animations: &'a AnimationLibrary,
    config: &'a GameConfig,
}

impl<'a> LevelBuilder<'a> {
    pub fn new(
        textures: &'a TextureRegistry,
        animations: &'a AnimationLibrary,
        config: &'a GameConfig,
    ) -> Self {
        Self { textures, animations, config }
    }

    /// Build every entity in `desc`, or fail without producing any.
    pub fn build(&self, desc: &LevelDescription) -> Result<LevelEntities, LevelError> {
        let player_start = desc.player.ok_or(LevelError::MissingPlayerStart)?;
        let goal_position = desc.goal.ok_or(LevelError::MissingGoal)?;

        let mut next_id: EntityId = 0;
        let mut allocate = || {
            let id = next_id;
            next_id += 1;
            id
        };

        let platforms = desc
            .platforms
            .iter()
            .enumerate()
            .map(|(index, spec)| self.platform(allocate(), index, spec))
            .collect::<Result<Vec<_>, _>>()?;

        let hazards = desc
            .hazards
            .iter()
            .enumerate()
            .map(|(index, spec)| self.hazard(allocate(), index, spec))
            .collect::<Result<Vec<_>, _>>()?;

        let player = self.player(allocate(), player_start)?;
        let goal = self.goal(allocate(), goal_position)?;

        let platform_ids: Vec<EntityId> = platforms.iter().map(|p| p.id).collect();
        let mut watched: Vec<EntityId> = hazards.iter().map(|h| h.id).collect();
        watched.push(goal.id);

        let colliders = vec![
            Collider { body: player.id, against: platform_ids.clone() },
            Collider { body: goal.id, against: platform_ids },
        ];
        let overlaps = vec![OverlapWatch { body: player.id, against: watched }];

        info!(
            platforms = platforms.len(),
            hazards = hazards.len(),
            edit_mode = self.config.is_edit_mode(),
            "level built"
        );

        Ok(LevelEntities {
            platforms,
            hazards,
            player,
            goal,
            colliders,
            overlaps,
        })
    }

    /// Single-tile platforms are plain sprites at native size; anything
    /// longer is a tile strip `num_tiles` textures wide.
    fn platform(&self, id: EntityId, index: usize, spec: &PlatformSpec) -> Result<Entity, LevelError> {
        let context = format!("platform {}", index);
        let texture = self.textures.get(&spec.key).ok_or_else(|| LevelError::UnknownTexture {
            key: spec.key.clone(),
            context: context.clone(),
        })?;
        let position = point(&context, spec.x, spec.y)?;
        let tile = texture.tile_size();

        let size = match spec.num_tiles {
            0 => return Err(LevelError::ZeroTiles { index }),
            1 => tile,
            tiles => {
                let width = i32::try_from(tiles)
                    .ok()
                    .and_then(|n| tile.x.checked_mul(n))
                    .ok_or(LevelError::PlatformTooWide { index, tiles })?;
                FixedVec2::new(width, tile.y)
            }
        };
        position
            .x
            .checked_add(size.x)
            .and(position.y.checked_add(size.y))
            .ok_or(LevelError::PlatformTooWide { index, tiles: spec.num_tiles })?;

        debug!(id, key = %spec.key, tiles = spec.num_tiles, %position, "platform");

        Ok(Entity {
            id,
            kind: EntityKind::Platform,
            texture: spec.key.clone(),
            position,
            size,
            origin: Origin::TopLeft,
            tiles: spec.num_tiles,
            body: Body::fixed(),
            animation: Default::default(),
            frame: 0,
            facing: Facing::Left,
            draggable: false,
        })
    }

    /// Fires burn from the moment they exist. They can be dragged only
    /// while authoring.
    fn hazard(&self, id: EntityId, index: usize, spec: &HazardSpec) -> Result<Entity, LevelError> {
        let context = format!("fire {}", index);
        let size = self.texture(keys::FIRE, &context)?;
        let burning = self
            .animations
            .get(BURNING)
            .ok_or_else(|| LevelError::UnknownAnimation(BURNING.to_string()))?;

        let mut entity = Entity {
            id,
            kind: EntityKind::Hazard,
            texture: keys::FIRE.to_string(),
            position: point(&context, spec.x, spec.y)?,
            size,
            origin: Origin::TopLeft,
            tiles: 1,
            body: Body::floating(),
            animation: Default::default(),
            frame: 0,
            facing: Facing::Left,
            draggable: self.config.is_edit_mode(),
        };
        if let Some(frame) = entity.animation.play(burning) {
            entity.frame = frame;
        }
        Ok(entity)
    }

    fn player(&self, id: EntityId, start: Point) -> Result<Entity, LevelError> {
        let size = self.texture(keys::PLAYER, "player")?;
        let mut body = Body::dynamic();
        body.collide_world_bounds = true;

        Ok(Entity {
            id,
            kind: EntityKind::Player,
            texture: keys::PLAYER.to_string(),
            position: point("player", start.x, start.y)?,
            size,
            origin: Origin::Center,
            tiles: 1,
            body,
            animation: Default::default(),
            frame: IDLE_FRAME,
            facing: Facing::Left,
            draggable: false,
        })
    }

    fn goal(&self, id: EntityId, position: Point) -> Result<Entity, LevelError> {
        let size = self.texture(keys::GOAL, "goal")?;
        // Settles onto a platform or the world floor, never below it
        let mut body = Body::dynamic();
        body.collide_world_bounds = true;

        Ok(Entity {
            id,
            kind: EntityKind::Goal,
            texture: keys::GOAL.to_string(),
            position: point("goal", position.x, position.y)?,
            size,
            origin: Origin::Center,
            tiles: 1,
            body,
            animation: Default::default(),
            frame: 0,
            facing: Facing::Left,
            draggable: false,
        })
    }

    fn texture(&self, key: &str, context: &str) -> Result<FixedVec2, LevelError> {
        self.textures
            .get(key)
            .map(|info| info.tile_size())
            .ok_or_else(|| LevelError::UnknownTexture {
                key: key.to_string(),
                context: context.to_string(),
            })
    }
}

/// Build a level with the standard animations.
pub fn build_level(
    desc: &LevelDescription,
    textures: &TextureRegistry,
    config: &GameConfig,
) -> Result<LevelEntities, LevelError> {
    let animations = AnimationLibrary::standard();
    LevelBuilder::new(textures, &animations, config).build(desc)
}

fn coordinate(context: &str, value: f64) -> Result<Fixed, LevelError> {
    if !value.is_finite() || value.abs() > COORDINATE_LIMIT {
        return Err(LevelError::InvalidCoordinate {
            context: context.to_string(),
            value,
        });
    }
    Ok(to_fixed(value))
}

fn point(context: &str, x: f64, y: f64) -> Result<FixedVec2, LevelError> {
    Ok(FixedVec2::new(coordinate(context, x)?, coordinate(context, y)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayMode;
    use crate::core::fixed::from_int;
    use crate::game::entity::BodyKind;
    use proptest::prelude::*;

    const ONE_PLATFORM: &str = r#"{
        "platforms": [{"x": 180, "y": 400, "key": "ground", "numTiles": 1}],
        "fires": [],
        "player": {"x": 180, "y": 250},
        "goal": {"x": 400, "y": 100}
    }"#;

    fn build(desc: &LevelDescription) -> Result<LevelEntities, LevelError> {
        build_level(desc, &TextureRegistry::builtin(), &GameConfig::default())
    }

    fn with_platform(key: &str, num_tiles: u32) -> LevelDescription {
        LevelDescription {
            platforms: vec![PlatformSpec { x: 10.0, y: 500.0, key: key.to_string(), num_tiles }],
            hazards: vec![],
            player: Some(Point { x: 50.0, y: 50.0 }),
            goal: Some(Point { x: 300.0, y: 50.0 }),
        }
    }

    #[test]
    fn test_one_platform_level() {
        let desc = LevelDescription::from_json_str(ONE_PLATFORM).unwrap();
        let level = build(&desc).unwrap();

        assert_eq!(level.platforms.len(), 1);
        assert_eq!(level.hazards.len(), 0);
        assert_eq!(level.player.position, FixedVec2::from_ints(180, 250));
        assert_eq!(level.goal.position, FixedVec2::from_ints(400, 100));
        assert_eq!(level.player.kind, EntityKind::Player);
        assert_eq!(level.goal.kind, EntityKind::Goal);
    }

    #[test]
    fn test_bundled_demo_level_builds() {
        let desc = LevelDescription::from_json_str(include_str!("../../assets/levels/demo.json")).unwrap();
        let level = build(&desc).unwrap();
        assert_eq!(level.platforms.len(), 6);
        assert_eq!(level.hazards.len(), 4);
        assert_eq!(level.platforms[0].width(), from_int(720));
    }

    #[test]
    fn test_single_tile_platform_is_native_sprite() {
        let level = build(&with_platform("ground", 1)).unwrap();
        let platform = &level.platforms[0];

        assert_eq!(platform.position, FixedVec2::from_ints(10, 500));
        assert_eq!(platform.size, FixedVec2::from_ints(360, 30));
        assert_eq!(platform.origin, Origin::TopLeft);
        assert!(platform.body.is_static());
        assert_eq!(platform.tiles, 1);
    }

    #[test]
    fn test_tiled_platform_width() {
        let level = build(&with_platform("block", 6)).unwrap();
        let platform = &level.platforms[0];

        assert_eq!(platform.width(), from_int(6 * 36));
        assert_eq!(platform.size.y, from_int(30));
        assert!(platform.body.is_static());
        assert_eq!(platform.bounds().min, FixedVec2::from_ints(10, 500));
    }

    #[test]
    fn test_unknown_texture_rejected() {
        let err = build(&with_platform("lava", 2)).unwrap_err();
        assert!(matches!(err, LevelError::UnknownTexture { ref key, .. } if key == "lava"));
    }

    #[test]
    fn test_zero_tiles_rejected() {
        let err = build(&with_platform("block", 0)).unwrap_err();
        assert!(matches!(err, LevelError::ZeroTiles { index: 0 }));
    }

    #[test]
    fn test_absurd_tile_count_rejected() {
        let err = build(&with_platform("block", u32::MAX)).unwrap_err();
        assert!(matches!(err, LevelError::PlatformTooWide { index: 0, .. }));
    }

    #[test]
    fn test_platform_past_coordinate_range_rejected() {
        let mut desc = with_platform("ground", 3);
        desc.platforms[0].x = 32000.0;
        let err = build(&desc).unwrap_err();
        assert!(matches!(err, LevelError::PlatformTooWide { index: 0, tiles: 3 }));

        desc.platforms[0].num_tiles = 1;
        desc.platforms[0].x = 32500.0;
        assert!(matches!(build(&desc).unwrap_err(), LevelError::PlatformTooWide { .. }));

        desc.platforms[0].x = 32000.0;
        let level = build(&desc).unwrap();
        assert!(level.platforms[0].bounds().max.x > level.platforms[0].bounds().min.x);
    }

    #[test]
    fn test_missing_player_and_goal() {
        let mut desc = with_platform("block", 1);
        desc.player = None;
        assert!(matches!(build(&desc).unwrap_err(), LevelError::MissingPlayerStart));

        let desc = LevelDescription::from_json_str(r#"{"player": {"x": 1, "y": 1}}"#).unwrap();
        assert!(matches!(build(&desc).unwrap_err(), LevelError::MissingGoal));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let mut desc = with_platform("block", 1);
        desc.hazards.push(HazardSpec { x: f64::NAN, y: 0.0 });
        assert!(matches!(
            build(&desc).unwrap_err(),
            LevelError::InvalidCoordinate { .. }
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = LevelDescription::from_json_str("{\"platforms\": 3}").unwrap_err();
        assert!(matches!(err, LevelError::Parse(_)));
    }

    #[test]
    fn test_hazards_burn_and_float() {
        let mut desc = with_platform("ground", 1);
        desc.hazards = vec![HazardSpec { x: 40.0, y: 470.0 }, HazardSpec { x: 90.0, y: 470.0 }];
        let level = build(&desc).unwrap();

        assert_eq!(level.hazards.len(), 2);
        for fire in &level.hazards {
            assert_eq!(fire.kind, EntityKind::Hazard);
            assert_eq!(fire.body.kind, BodyKind::Dynamic);
            assert!(!fire.body.allow_gravity);
            assert!(fire.body.immovable);
            assert!(fire.animation.is_playing_key(BURNING));
            assert!(!fire.draggable);
        }
        assert_eq!(level.hazards[1].position, FixedVec2::from_ints(90, 470));
    }

    #[test]
    fn test_hazards_draggable_only_in_edit_mode() {
        let mut desc = with_platform("ground", 1);
        desc.hazards = vec![HazardSpec { x: 40.0, y: 470.0 }];
        let config = GameConfig::default().with_mode(PlayMode::Edit);
        let level = build_level(&desc, &TextureRegistry::builtin(), &config).unwrap();
        assert!(level.hazards[0].draggable);
    }

    #[test]
    fn test_player_and_goal_bodies() {
        let level = build(&with_platform("ground", 1)).unwrap();
        assert_eq!(level.player.body.kind, BodyKind::Dynamic);
        assert!(level.player.body.collide_world_bounds);
        assert_eq!(level.player.frame, IDLE_FRAME);
        assert_eq!(level.player.origin, Origin::Center);

        assert_eq!(level.goal.body.kind, BodyKind::Dynamic);
        assert!(level.goal.body.allow_gravity);
        assert!(level.goal.body.collide_world_bounds);
    }

    #[test]
    fn test_collision_registrations() {
        let mut desc = with_platform("ground", 1);
        desc.platforms.push(PlatformSpec { x: 0.0, y: 200.0, key: "block".into(), num_tiles: 3 });
        desc.hazards = vec![HazardSpec { x: 40.0, y: 470.0 }];
        let level = build(&desc).unwrap();

        let platform_ids = vec![0, 1];
        assert_eq!(level.colliders.len(), 2);
        assert_eq!(level.colliders[0], Collider { body: level.player.id, against: platform_ids.clone() });
        assert_eq!(level.colliders[1], Collider { body: level.goal.id, against: platform_ids });
        assert_eq!(level.overlaps[0].against, vec![level.hazards[0].id, level.goal.id]);
    }

    #[test]
    fn test_ids_follow_build_order() {
        let mut desc = with_platform("ground", 1);
        desc.hazards = vec![HazardSpec { x: 40.0, y: 470.0 }];
        let level = build(&desc).unwrap();
        assert_eq!(level.platforms[0].id, 0);
        assert_eq!(level.hazards[0].id, 1);
        assert_eq!(level.player.id, 2);
        assert_eq!(level.goal.id, 3);
    }

    #[test]
    fn test_json_round_trip_uses_document_names() {
        let desc = LevelDescription::from_json_str(ONE_PLATFORM).unwrap();
        let json = desc.to_json_string().unwrap();
        assert!(json.contains("\"numTiles\""));
        assert!(json.contains("\"fires\""));
        assert_eq!(LevelDescription::from_json_str(&json).unwrap(), desc);
    }

    proptest! {
        #[test]
        fn prop_platform_geometry(
            x in -1000i32..1000,
            y in -1000i32..1000,
            tiles in 1u32..64,
            key in prop::sample::select(vec!["ground", "platform", "block"]),
        ) {
            let mut desc = with_platform(key, tiles);
            desc.platforms[0].x = x as f64;
            desc.platforms[0].y = y as f64;
            let level = build(&desc).unwrap();

            prop_assert_eq!(level.platforms.len(), 1);
            let platform = &level.platforms[0];
            let tile = TextureRegistry::builtin().get(key).unwrap().tile_size();

            prop_assert!(platform.body.is_static());
            prop_assert_eq!(platform.position, FixedVec2::from_ints(x, y));
            prop_assert_eq!(platform.width(), tile.x * tiles as i32);
            prop_assert_eq!(platform.size.y, tile.y);
        }

        #[test]
        fn prop_every_hazard_becomes_one_entity(count in 0usize..20) {
            let mut desc = with_platform("ground", 1);
            desc.hazards = (0..count)
                .map(|i| HazardSpec { x: (i * 25) as f64, y: 470.0 })
                .collect();
            let level = build(&desc).unwrap();
            prop_assert_eq!(level.hazards.len(), count);
            prop_assert_eq!(level.overlaps[0].against.len(), count + 1);
        }
    }
}
