//! Game Events
//!
//! Things the host loop may want to react to: the player touching fire,
//! reaching the goal, jumping, or an entity being repositioned in edit mode.

use serde::{Serialize, Deserialize};

use crate::core::vec2::FixedVec2;
use crate::game::entity::EntityId;

/// Order of events emitted within one tick. Lower value comes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths first, so a host can restart before anything else
    Hazard = 0,
    /// Level completion
    Goal = 1,
    /// Movement feedback
    Movement = 2,
    /// Edit-mode bookkeeping
    Authoring = 3,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player started overlapping a hazard
    HazardTouched {
        hazard: EntityId,
        position: FixedVec2,
    },

    /// Player started overlapping the goal
    GoalReached {
        position: FixedVec2,
    },

    /// Player left the ground with a jump impulse
    PlayerJumped {
        position: FixedVec2,
    },

    /// An entity was dragged in edit mode
    EntityDragged {
        entity: EntityId,
        position: FixedVec2,
    },
}

/// A game event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when the event occurred
    pub tick: u32,

    /// Ordering within the tick
    pub priority: EventPriority,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    fn new(tick: u32, data: GameEventData) -> Self {
        let priority = match &data {
            GameEventData::HazardTouched { .. } => EventPriority::Hazard,
            GameEventData::GoalReached { .. } => EventPriority::Goal,
            GameEventData::PlayerJumped { .. } => EventPriority::Movement,
            GameEventData::EntityDragged { .. } => EventPriority::Authoring,
        };
        Self { tick, priority, data }
    }

    pub fn hazard_touched(tick: u32, hazard: EntityId, position: FixedVec2) -> Self {
        Self::new(tick, GameEventData::HazardTouched { hazard, position })
    }

    pub fn goal_reached(tick: u32, position: FixedVec2) -> Self {
        Self::new(tick, GameEventData::GoalReached { position })
    }

    pub fn player_jumped(tick: u32, position: FixedVec2) -> Self {
        Self::new(tick, GameEventData::PlayerJumped { position })
    }

    pub fn entity_dragged(tick: u32, entity: EntityId, position: FixedVec2) -> Self {
        Self::new(tick, GameEventData::EntityDragged { entity, position })
    }

    /// Sort key: tick, then priority.
    #[inline]
    pub fn sort_key(&self) -> (u32, EventPriority) {
        (self.tick, self.priority)
    }
}

/// Sort events into processing order. Stable, so same-priority events keep
/// the order they were raised in.
pub fn sort_events(events: &mut [GameEvent]) {
    events.sort_by_key(GameEvent::sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_assigned_from_data() {
        let pos = FixedVec2::ZERO;
        assert_eq!(GameEvent::hazard_touched(1, 4, pos).priority, EventPriority::Hazard);
        assert_eq!(GameEvent::goal_reached(1, pos).priority, EventPriority::Goal);
        assert_eq!(GameEvent::player_jumped(1, pos).priority, EventPriority::Movement);
        assert_eq!(GameEvent::entity_dragged(1, 4, pos).priority, EventPriority::Authoring);
    }

    #[test]
    fn test_sort_events() {
        let pos = FixedVec2::ZERO;
        let mut events = vec![
            GameEvent::player_jumped(5, pos),
            GameEvent::goal_reached(5, pos),
            GameEvent::hazard_touched(5, 2, pos),
            GameEvent::hazard_touched(5, 1, pos),
            GameEvent::player_jumped(4, pos),
        ];
        sort_events(&mut events);

        assert_eq!(events[0].tick, 4);
        assert_eq!(events[1].data, GameEventData::HazardTouched { hazard: 2, position: pos });
        assert_eq!(events[2].data, GameEventData::HazardTouched { hazard: 1, position: pos });
        assert_eq!(events[3].priority, EventPriority::Goal);
        assert_eq!(events[4].priority, EventPriority::Movement);
    }
}
