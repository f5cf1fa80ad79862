//! Replanning schedule for chasing agents
//!
//! Searching every frame for every enemy spikes frame time when a large group
//! is chasing. Each agent only considers replanning on frames matching its
//! slot within the spread window, and then only when its cooldown ran out or
//! the target moved far from where the last path was aimed.

use bevy::prelude::*;

/// Slot used when an agent is not assigned one explicitly
pub const DEFAULT_UPDATE_SLOT: u32 = 1;

/// Tunables shared by every chasing agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseSettings {
    /// Distance under which a dormant agent starts chasing
    pub chase_distance: f32,
    /// Number of frames replanning is spread over
    pub spread_window: u32,
    /// Seconds between forced replans
    pub rebuild_cooldown: f32,
    /// Target displacement that forces a replan before the cooldown expires
    pub target_move_threshold: f32,
    /// Distance at which a waypoint counts as reached
    pub arrival_tolerance: f32,
}

impl Default for ChaseSettings {
    fn default() -> Self {
        Self {
            chase_distance: 8.0,
            spread_window: 60,
            rebuild_cooldown: 2.0,
            target_move_threshold: 3.0,
            arrival_tolerance: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChaseMode {
    /// Target has never come within chase distance
    #[default]
    Dormant,
    /// Chasing; stays active for the rest of the agent's life
    Active,
}

/// What the scheduler decided for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    Dormant,
    /// Active, but this frame belongs to other slots
    OffSlot,
    /// On slot, but the current path is still fresh
    Hold,
    /// A new path must be planned this frame
    Replan,
}

/// Per-agent replanning state
#[derive(Debug, Clone, PartialEq)]
pub struct PathScheduler {
    mode: ChaseMode,
    cooldown: f32,
    reference: Option<Vec2>,
    slot: u32,
}

impl Default for PathScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_SLOT)
    }
}

impl PathScheduler {
    pub fn new(slot: u32) -> Self {
        Self {
            mode: ChaseMode::Dormant,
            cooldown: 0.0,
            reference: None,
            slot,
        }
    }

    pub fn mode(&self) -> ChaseMode {
        self.mode
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn set_slot(&mut self, slot: u32) {
        self.slot = slot;
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Target position the current path was planned against
    pub fn reference(&self) -> Option<Vec2> {
        self.reference
    }

    /// Advance one frame and decide whether to plan a new path
    ///
    /// A `Replan` decision has already reset the cooldown and recorded
    /// `target` as the new reference position.
    pub fn tick(
        &mut self,
        frame: u32,
        dt: f32,
        agent: Vec2,
        target: Vec2,
        settings: &ChaseSettings,
    ) -> ScheduleDecision {
        if self.mode == ChaseMode::Dormant {
            if agent.distance(target) >= settings.chase_distance {
                return ScheduleDecision::Dormant;
            }
            self.mode = ChaseMode::Active;
            debug!(
                "Agent on slot {} started chasing at distance {:.2}",
                self.slot,
                agent.distance(target)
            );
        }

        self.cooldown -= dt;

        if !is_slot_frame(frame, self.slot, settings.spread_window) {
            return ScheduleDecision::OffSlot;
        }

        let target_moved = self
            .reference
            .is_none_or(|reference| reference.distance(target) > settings.target_move_threshold);

        if self.cooldown > 0.0 && !target_moved {
            return ScheduleDecision::Hold;
        }

        self.cooldown = settings.rebuild_cooldown;
        self.reference = Some(target);
        ScheduleDecision::Replan
    }
}

/// True when `frame` falls on `slot` within a window of `window` frames
///
/// The slot is taken modulo the window so any configured value fires, and a
/// zero window behaves like a window of one.
pub fn is_slot_frame(frame: u32, slot: u32, window: u32) -> bool {
    let window = window.max(1);
    frame % window == slot % window
}

/// Hands out slots round-robin so consecutive spawns land on different frames
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotAllocator {
    spawned: u32,
}

impl SlotAllocator {
    pub fn next_slot(&mut self, window: u32) -> u32 {
        let slot = self.spawned % window.max(1);
        self.spawned = self.spawned.wrapping_add(1);
        slot
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }
}
