//! Frame Animations
//!
//! Named frame sequences and a per-entity player that advances them with the
//! frame clock. The controller only ever says "play walking" or "stop
//! walking"; timing and ping-pong live here.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE};

/// Player walk cycle
pub const WALKING: &str = "walking";

/// Hazard flicker
pub const BURNING: &str = "burning";

/// How many times an animation cycle repeats after the first pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    /// Loop until stopped
    Forever,
    /// Extra passes before stopping on the last frame
    Times(u32),
}

/// A named frame sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDef {
    /// Lookup key ("walking", "burning")
    pub key: String,
    /// Spritesheet frame indices in play order
    pub frames: Vec<u16>,
    /// Frames per second
    pub frame_rate: u32,
    /// Play forward then backward
    pub yoyo: bool,
    /// Repeat policy
    pub repeat: Repeat,
}

impl AnimationDef {
    /// Duration of one frame in fixed-point seconds, never zero.
    pub fn frame_duration(&self) -> Fixed {
        let rate = Fixed::try_from(self.frame_rate.max(1)).unwrap_or(Fixed::MAX);
        (FIXED_ONE / rate).max(1)
    }

    /// Frame index for a step within one cycle.
    ///
    /// Yoyo cycles walk back through the interior frames, so `[0, 1, 2]`
    /// plays `0 1 2 1` and then wraps.
    fn frame_at(&self, step: usize) -> u16 {
        let len = self.frames.len();
        if step < len {
            self.frames[step]
        } else {
            self.frames[2 * (len - 1) - step]
        }
    }

    /// Steps in one cycle.
    fn cycle_len(&self) -> usize {
        let len = self.frames.len();
        if self.yoyo && len > 2 {
            2 * (len - 1)
        } else {
            len
        }
    }
}

/// The animations a level uses, by key.
#[derive(Clone, Debug, Default)]
pub struct AnimationLibrary {
    defs: BTreeMap<String, AnimationDef>,
}

impl AnimationLibrary {
    /// Walking (player frames 0-2, 12 fps, yoyo, looping) and burning
    /// (fire frames 0-1, 4 fps, looping).
    pub fn standard() -> Self {
        let mut library = Self::default();
        library.insert(AnimationDef {
            key: WALKING.to_string(),
            frames: vec![0, 1, 2],
            frame_rate: 12,
            yoyo: true,
            repeat: Repeat::Forever,
        });
        library.insert(AnimationDef {
            key: BURNING.to_string(),
            frames: vec![0, 1],
            frame_rate: 4,
            yoyo: false,
            repeat: Repeat::Forever,
        });
        library
    }

    /// Add or replace a definition. Empty definitions are ignored.
    pub fn insert(&mut self, def: AnimationDef) {
        if def.frames.is_empty() {
            return;
        }
        self.defs.insert(def.key.clone(), def);
    }

    /// Look up a definition.
    pub fn get(&self, key: &str) -> Option<&AnimationDef> {
        self.defs.get(key)
    }
}

/// Playback state for one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationPlayer {
    current: Option<AnimationDef>,
    playing: bool,
    step: usize,
    elapsed: Fixed,
    passes: u32,
}

impl AnimationPlayer {
    /// Start `def` from its first frame, returning that frame.
    ///
    /// Restarts even if the same animation is already playing; callers that
    /// want "play if not playing" check [`is_playing`](Self::is_playing).
    /// A definition with no frames is not started.
    pub fn play(&mut self, def: &AnimationDef) -> Option<u16> {
        let first = def.frames.first().copied()?;
        self.current = Some(def.clone());
        self.playing = true;
        self.step = 0;
        self.elapsed = 0;
        self.passes = 0;
        Some(first)
    }

    /// Stop `key` if it is the current animation. The last shown frame stays.
    pub fn stop(&mut self, key: &str) {
        if self.current_key() == Some(key) {
            self.playing = false;
        }
    }

    /// Whether any animation is running.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether `key` specifically is running.
    pub fn is_playing_key(&self, key: &str) -> bool {
        self.playing && self.current_key() == Some(key)
    }

    /// Key of the current (possibly stopped) animation.
    pub fn current_key(&self) -> Option<&str> {
        self.current.as_ref().map(|def| def.key.as_str())
    }

    /// Advance by `dt`. Returns the new frame when it changed.
    pub fn advance(&mut self, dt: Fixed) -> Option<u16> {
        if !self.playing {
            return None;
        }
        let def = self.current.as_ref()?;
        let duration = def.frame_duration();
        let cycle = def.cycle_len();
        let before = self.step;

        self.elapsed += dt;
        while self.elapsed >= duration {
            self.elapsed -= duration;
            self.step += 1;

            if self.step >= cycle {
                match def.repeat {
                    Repeat::Forever => self.step = 0,
                    Repeat::Times(n) if self.passes < n => {
                        self.passes += 1;
                        self.step = 0;
                    }
                    Repeat::Times(_) => {
                        self.step = cycle - 1;
                        self.playing = false;
                        break;
                    }
                }
            }
        }

        if self.step != before {
            Some(def.frame_at(self.step))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::TICK_DURATION;

    fn walking() -> AnimationDef {
        AnimationLibrary::standard().get(WALKING).cloned().unwrap()
    }

    /// Run `ticks` frames and collect the frame shown after each.
    fn frames_over(player: &mut AnimationPlayer, start: u16, ticks: usize) -> Vec<u16> {
        let mut frame = start;
        (0..ticks)
            .map(|_| {
                if let Some(next) = player.advance(TICK_DURATION) {
                    frame = next;
                }
                frame
            })
            .collect()
    }

    #[test]
    fn test_standard_library() {
        let library = AnimationLibrary::standard();
        let walk = library.get(WALKING).unwrap();
        assert_eq!(walk.frames, vec![0, 1, 2]);
        assert_eq!(walk.frame_rate, 12);
        assert!(walk.yoyo);
        assert_eq!(walk.repeat, Repeat::Forever);

        let burn = library.get(BURNING).unwrap();
        assert_eq!(burn.frames, vec![0, 1]);
        assert_eq!(burn.frame_rate, 4);
    }

    #[test]
    fn test_walking_yoyo_order() {
        let mut player = AnimationPlayer::default();
        let first = player.play(&walking()).unwrap();
        assert_eq!(first, 0);

        // 12 fps at 60 Hz: roughly a new frame every 5 ticks
        let mut shown = frames_over(&mut player, first, 25);
        assert_eq!(shown[0], 0);
        shown.dedup();
        assert_eq!(shown, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_stop_keeps_frame() {
        let mut player = AnimationPlayer::default();
        player.play(&walking());
        frames_over(&mut player, 0, 5);
        player.stop(WALKING);
        assert!(!player.is_playing());
        assert_eq!(player.advance(FIXED_ONE), None);
        assert_eq!(player.current_key(), Some(WALKING));
    }

    #[test]
    fn test_stop_other_key_is_noop() {
        let mut player = AnimationPlayer::default();
        player.play(&walking());
        player.stop(BURNING);
        assert!(player.is_playing_key(WALKING));
    }

    #[test]
    fn test_finite_repeat_stops_on_last_frame() {
        let def = AnimationDef {
            key: "blink".to_string(),
            frames: vec![4, 5],
            frame_rate: 60,
            yoyo: false,
            repeat: Repeat::Times(1),
        };
        let mut player = AnimationPlayer::default();
        player.play(&def);
        let shown = frames_over(&mut player, 4, 6);
        assert_eq!(shown, vec![5, 4, 5, 5, 5, 5]);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_frame_rate_beyond_clock_resolution() {
        let def = AnimationDef {
            key: "flash".to_string(),
            frames: vec![0, 1],
            frame_rate: u32::MAX,
            yoyo: false,
            repeat: Repeat::Forever,
        };
        assert_eq!(def.frame_duration(), 1);

        let mut player = AnimationPlayer::default();
        player.play(&def);
        assert_eq!(player.advance(TICK_DURATION + 1), Some(1));
    }

    #[test]
    fn test_play_empty_definition_directly() {
        let def = AnimationDef {
            key: "nothing".to_string(),
            frames: vec![],
            frame_rate: 10,
            yoyo: false,
            repeat: Repeat::Forever,
        };
        let mut player = AnimationPlayer::default();
        assert_eq!(player.play(&def), None);
        assert!(!player.is_playing());
        assert_eq!(player.advance(FIXED_ONE), None);
    }

    #[test]
    fn test_empty_definition_rejected() {
        let mut library = AnimationLibrary::default();
        library.insert(AnimationDef {
            key: "nothing".to_string(),
            frames: vec![],
            frame_rate: 10,
            yoyo: false,
            repeat: Repeat::Forever,
        });
        assert!(library.get("nothing").is_none());
    }
}
