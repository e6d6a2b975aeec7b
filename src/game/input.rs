//! Input Snapshots and Recording
//!
//! The controller polls a snapshot of four keys each frame. Snapshots are
//! packed into a single byte so whole sessions can be recorded cheaply and
//! replayed tick-for-tick.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{StateHash, StateHasher};

// =============================================================================
// INPUT SNAPSHOT
// =============================================================================

/// Key state for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Held keys (packed bits):
    /// - Bit 0: left
    /// - Bit 1: right
    /// - Bit 2: up
    /// - Bit 3: space
    /// - Bit 4-7: reserved
    pub flags: u8,
}

/// Resolved horizontal intent for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Horizontal {
    /// Left is held (wins over right)
    Left,
    /// Right is held and left is not
    Right,
    /// Neither direction held
    Neutral,
}

impl InputSnapshot {
    /// Left arrow bit
    pub const FLAG_LEFT: u8 = 0x01;
    /// Right arrow bit
    pub const FLAG_RIGHT: u8 = 0x02;
    /// Up arrow bit
    pub const FLAG_UP: u8 = 0x04;
    /// Space bar bit
    pub const FLAG_SPACE: u8 = 0x08;

    const KEY_MASK: u8 = Self::FLAG_LEFT | Self::FLAG_RIGHT | Self::FLAG_UP | Self::FLAG_SPACE;

    /// All keys up.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Snapshot from individual key states.
    pub const fn from_keys(left: bool, right: bool, up: bool, space: bool) -> Self {
        let mut flags = 0;
        if left {
            flags |= Self::FLAG_LEFT;
        }
        if right {
            flags |= Self::FLAG_RIGHT;
        }
        if up {
            flags |= Self::FLAG_UP;
        }
        if space {
            flags |= Self::FLAG_SPACE;
        }
        Self { flags }
    }

    /// Snapshot from raw bits; reserved bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self { flags: bits & Self::KEY_MASK }
    }

    /// Only left held.
    pub const fn left_only() -> Self {
        Self::from_keys(true, false, false, false)
    }

    /// Only right held.
    pub const fn right_only() -> Self {
        Self::from_keys(false, true, false, false)
    }

    /// Only up held.
    pub const fn up_only() -> Self {
        Self::from_keys(false, false, true, false)
    }

    #[inline]
    pub fn left(&self) -> bool {
        self.flags & Self::FLAG_LEFT != 0
    }

    #[inline]
    pub fn right(&self) -> bool {
        self.flags & Self::FLAG_RIGHT != 0
    }

    #[inline]
    pub fn up(&self) -> bool {
        self.flags & Self::FLAG_UP != 0
    }

    #[inline]
    pub fn space(&self) -> bool {
        self.flags & Self::FLAG_SPACE != 0
    }

    /// Either jump key (space or up) is held.
    #[inline]
    pub fn jump_held(&self) -> bool {
        self.up() || self.space()
    }

    /// Horizontal intent. Left is checked first, so it wins when both
    /// directions are held.
    #[inline]
    pub fn horizontal(&self) -> Horizontal {
        if self.left() {
            Horizontal::Left
        } else if self.right() {
            Horizontal::Right
        } else {
            Horizontal::Neutral
        }
    }

    /// No key held.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }

    #[inline]
    pub fn set_left(&mut self, held: bool) {
        self.set_flag(Self::FLAG_LEFT, held);
    }

    #[inline]
    pub fn set_right(&mut self, held: bool) {
        self.set_flag(Self::FLAG_RIGHT, held);
    }

    #[inline]
    pub fn set_up(&mut self, held: bool) {
        self.set_flag(Self::FLAG_UP, held);
    }

    #[inline]
    pub fn set_space(&mut self, held: bool) {
        self.set_flag(Self::FLAG_SPACE, held);
    }

    #[inline]
    fn set_flag(&mut self, flag: u8, held: bool) {
        if held {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// A snapshot that took effect at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub snapshot: InputSnapshot,
}

/// Recording errors.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// Encoding or decoding failed.
    #[error("recording codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Input recording for one play session.
///
/// Only ticks where the snapshot changed are stored. Used for replays and
/// for checking that a run is reproducible.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// First recorded tick
    pub start_tick: u32,

    /// Last recorded tick
    pub end_tick: u32,

    deltas: Vec<InputDelta>,

    #[serde(skip)]
    last_snapshot: InputSnapshot,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self {
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(128),
            last_snapshot: InputSnapshot::new(),
        }
    }

    /// Record the snapshot for a tick. Stored only if it changed.
    pub fn record(&mut self, tick: u32, snapshot: InputSnapshot) {
        self.end_tick = tick;

        if snapshot != self.last_snapshot {
            self.deltas.push(InputDelta { tick, snapshot });
            self.last_snapshot = snapshot;
        }
    }

    /// Snapshot in effect at `tick`. Idle before the first change.
    pub fn input_at(&self, tick: u32) -> InputSnapshot {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputSnapshot::new()
        } else {
            self.deltas[idx - 1].snapshot
        }
    }

    /// All stored changes.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of stored changes.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Mark the recording as ending at `end_tick`.
    pub fn finalize(&mut self, end_tick: u32) {
        self.end_tick = end_tick;
    }

    /// Iterate `(tick, snapshot)` for every tick in the recording.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current: InputSnapshot::new(),
        }
    }

    /// Hash of the recorded changes.
    pub fn hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_input_recording();
        hasher.update_u32(self.start_tick);
        hasher.update_u32(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.snapshot.flags);
        }
        hasher.finalize()
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordingError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode with bincode. Further `record` calls continue from the last
    /// stored snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordingError> {
        let mut recording: InputRecording = bincode::deserialize(bytes)?;
        recording.last_snapshot = recording
            .deltas
            .last()
            .map(|d| d.snapshot)
            .unwrap_or_default();
        Ok(recording)
    }
}

/// Iterator for replaying a recording tick by tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current: InputSnapshot,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, InputSnapshot);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current = delta.snapshot;
            self.delta_idx += 1;
        }

        let item = (self.current_tick, self.current);
        self.current_tick += 1;
        Some(item)
    }
}

// =============================================================================
// TESTS
// =============================================================================
