use crate::pathfinding::{
    find_path, resolve_reachable_target, ChaseMode, ChaseSettings, CostGrid, FollowStep,
    MovementSignal, MovementSink, PathFollower, PathScheduler, ResolvedTarget, ScheduleDecision,
    SpawnPoints,
};
use bevy::prelude::*;
use rand::Rng;

/// Navigation data of the room an agent is chasing in
pub trait RoomProvider {
    fn cost_grid(&self) -> &CostGrid;
    fn spawn_points(&self) -> &SpawnPoints;
}

/// Polled source of the chase target's position
pub trait TargetProvider {
    fn target_position(&self) -> Vec2;
}

impl TargetProvider for Vec2 {
    fn target_position(&self) -> Vec2 {
        *self
    }
}

/// Per-frame inputs of a chase tick
#[derive(Debug, Clone, Copy)]
pub struct ChaseTick<'a> {
    pub frame: u32,
    pub dt: f32,
    pub agent_position: Vec2,
    pub speed: f32,
    pub settings: &'a ChaseSettings,
}

/// What happened during one chase tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseOutcome {
    pub decision: ScheduleDecision,
    /// Goal used when a path was planned this tick
    pub goal: Option<ResolvedTarget>,
    /// Set when a replan was attempted, false when the search found nothing
    pub path_found: Option<bool>,
    pub follow: FollowStep,
}

/// Path state of one chasing enemy
///
/// Owns the replanning schedule and the follower so a single path is ever in
/// flight; a fresh plan always replaces the previous one before the next
/// follower step.
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub struct ChaseAgent {
    scheduler: PathScheduler,
    follower: PathFollower,
}

impl ChaseAgent {
    pub fn new(slot: u32) -> Self {
        Self {
            scheduler: PathScheduler::new(slot),
            follower: PathFollower::new(),
        }
    }

    pub fn slot(&self) -> u32 {
        self.scheduler.slot()
    }

    pub fn set_slot(&mut self, slot: u32) {
        self.scheduler.set_slot(slot);
    }

    pub fn mode(&self) -> ChaseMode {
        self.scheduler.mode()
    }

    pub fn is_following(&self) -> bool {
        self.follower.is_following()
    }

    pub fn scheduler(&self) -> &PathScheduler {
        &self.scheduler
    }

    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    /// Run the scheduler and then one follower step
    ///
    /// Searches run synchronously on the frame they are scheduled for. A
    /// failed search cancels the current run, which emits one idle signal,
    /// and the agent waits for its next slot to try again.
    pub fn tick<R, T, G>(
        &mut self,
        tick: ChaseTick<'_>,
        room: &R,
        target: &T,
        rng: &mut G,
        sink: &mut impl MovementSink,
    ) -> ChaseOutcome
    where
        R: RoomProvider + ?Sized,
        T: TargetProvider + ?Sized,
        G: Rng + ?Sized,
    {
        let target_position = target.target_position();
        let decision = self.scheduler.tick(
            tick.frame,
            tick.dt,
            tick.agent_position,
            target_position,
            tick.settings,
        );

        let mut goal = None;
        let mut path_found = None;

        if decision == ScheduleDecision::Replan {
            let grid = room.cost_grid();
            let resolved =
                resolve_reachable_target(target_position, grid, room.spawn_points(), rng);
            let start = grid.world_to_cell(tick.agent_position);
            goal = Some(resolved);

            match find_path(grid, start, resolved.cell()) {
                Some(path) => {
                    debug!(
                        "Slot {} planned {} waypoints from {start} to {} (cost {:.2})",
                        self.slot(),
                        path.len(),
                        resolved.cell(),
                        path.cost()
                    );
                    self.follower.start(path.into_waypoints(), sink);
                    path_found = Some(true);
                }
                None => {
                    warn!(
                        "No path from {start} to {} for slot {}, going idle",
                        resolved.cell(),
                        self.slot()
                    );
                    if !self.follower.cancel(sink) {
                        sink.emit(MovementSignal::Idle);
                    }
                    path_found = Some(false);
                }
            }
        }

        let follow = self.follower.step(
            tick.agent_position,
            tick.speed,
            tick.settings.arrival_tolerance,
            sink,
        );

        ChaseOutcome {
            decision,
            goal,
            path_found,
            follow,
        }
    }
}
