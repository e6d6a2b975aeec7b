//! Player Controller
//!
//! Per-frame state machine from input and ground contact to velocity,
//! facing and animation commands. The controller never moves the player
//! itself: physics integrates whatever velocity it asks for on the next
//! step, and world-bounds clamping stays with the physics engine.
//!
//! # Rules
//!
//! 1. Horizontal: left, else right, else stop. Left wins when both are held.
//! 2. Walking plays while moving on the ground; neutral input stops it and,
//!    on the ground, snaps to the rest pose.
//! 3. Jump, evaluated last: grounded with up or space held gives the jump
//!    impulse and the jump pose.

use crate::config::GameConfig;
use crate::core::fixed::Fixed;
use crate::game::animation::{AnimationLibrary, WALKING};
use crate::game::entity::{Contact, Entity, Facing};
use crate::game::input::{Horizontal, InputSnapshot};

/// Rest pose in the player spritesheet.
pub const IDLE_FRAME: u16 = 3;

/// Mid-stride pose shown while airborne after a jump.
pub const JUMP_FRAME: u16 = 2;

/// Visual state of the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerAnimState {
    #[default]
    Idle,
    Walking,
    Jumping,
}

/// Animation request for the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationCommand {
    /// Leave playback alone
    Keep,
    /// Start the named animation from its first frame
    Play(&'static str),
    /// Stop the named animation, keeping the frame it is on
    Stop(&'static str),
}

/// Everything the controller asks of the engine for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerCommands {
    /// Horizontal velocity, always set
    pub velocity_x: Fixed,
    /// Vertical velocity, set only by a jump
    pub velocity_y: Option<Fixed>,
    /// New facing, when a direction is held
    pub facing: Option<Facing>,
    /// Animation playback request
    pub animation: AnimationCommand,
    /// Frame to show, overriding the animation
    pub frame: Option<u16>,
}

impl PlayerCommands {
    /// Apply to the player entity.
    ///
    /// The animation command runs before the frame override, so a stop
    /// followed by a pose snap shows the pose.
    pub fn apply(&self, player: &mut Entity, animations: &AnimationLibrary) {
        player.body.velocity.x = self.velocity_x;
        if let Some(vy) = self.velocity_y {
            player.body.velocity.y = vy;
        }
        if let Some(facing) = self.facing {
            player.facing = facing;
        }

        match self.animation {
            AnimationCommand::Keep => {}
            AnimationCommand::Play(key) => {
                if let Some(frame) = animations.get(key).and_then(|def| player.animation.play(def)) {
                    player.frame = frame;
                }
            }
            AnimationCommand::Stop(key) => player.animation.stop(key),
        }

        if let Some(frame) = self.frame {
            player.frame = frame;
        }
    }
}

/// Speeds the controller commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuning {
    /// Horizontal speed (px/s)
    pub player_speed: Fixed,
    /// Jump impulse (px/s, negative is up)
    pub jump_speed: Fixed,
}

impl From<&GameConfig> for Tuning {
    fn from(config: &GameConfig) -> Self {
        Self {
            player_speed: config.player_speed,
            jump_speed: config.jump_speed,
        }
    }
}

/// One controller step as a pure function.
pub fn transition(
    prev: PlayerAnimState,
    input: InputSnapshot,
    grounded: bool,
    tuning: Tuning,
) -> (PlayerAnimState, PlayerCommands) {
    let mut commands = PlayerCommands {
        velocity_x: 0,
        velocity_y: None,
        facing: None,
        animation: AnimationCommand::Keep,
        frame: None,
    };

    let direction = match input.horizontal() {
        Horizontal::Left => Some((Facing::Left, -tuning.player_speed)),
        Horizontal::Right => Some((Facing::Right, tuning.player_speed)),
        Horizontal::Neutral => None,
    };

    let mut next = match direction {
        Some((facing, vx)) => {
            commands.velocity_x = vx;
            commands.facing = Some(facing);
            if !grounded {
                prev
            } else {
                if prev != PlayerAnimState::Walking {
                    commands.animation = AnimationCommand::Play(WALKING);
                }
                PlayerAnimState::Walking
            }
        }
        None => {
            commands.animation = AnimationCommand::Stop(WALKING);
            if grounded {
                commands.frame = Some(IDLE_FRAME);
                PlayerAnimState::Idle
            } else if prev == PlayerAnimState::Jumping {
                PlayerAnimState::Jumping
            } else {
                PlayerAnimState::Idle
            }
        }
    };

    if grounded && input.jump_held() {
        commands.velocity_y = Some(tuning.jump_speed);
        commands.animation = AnimationCommand::Stop(WALKING);
        commands.frame = Some(JUMP_FRAME);
        next = PlayerAnimState::Jumping;
    }

    (next, commands)
}

/// Snapshot of the player for the host, recomputed every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub facing: Facing,
    pub velocity_x: Fixed,
    pub velocity_y: Fixed,
    pub animation: PlayerAnimState,
    pub grounded: bool,
}

/// Stateful wrapper that remembers the previous animation state.
#[derive(Clone, Debug)]
pub struct PlayerController {
    state: PlayerAnimState,
    tuning: Tuning,
}

impl PlayerController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            state: PlayerAnimState::Idle,
            tuning: Tuning::from(config),
        }
    }

    /// Run one frame.
    pub fn tick(&mut self, input: InputSnapshot, contact: Contact) -> PlayerCommands {
        let (next, commands) = transition(self.state, input, contact.is_grounded(), self.tuning);
        self.state = next;
        commands
    }

    /// State after the last tick.
    #[inline]
    pub fn state(&self) -> PlayerAnimState {
        self.state
    }

    #[inline]
    pub fn tuning(&self) -> Tuning {
        self.tuning
    }
}
