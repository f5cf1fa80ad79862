//! Waypoint follower
//!
//! Walks a planned route one fixed tick at a time. Each step handles at most
//! one waypoint and emits at most one movement signal, so the caller decides
//! when the next step happens.

use bevy::prelude::*;
use std::collections::VecDeque;

/// Output of the chase core, consumed by whatever actually moves the agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementSignal {
    MoveToward {
        waypoint: Vec2,
        current_position: Vec2,
        speed: f32,
        /// Unit vector from the current position to the waypoint
        direction: Vec2,
    },
    Idle,
}

/// Receiver of movement signals
pub trait MovementSink {
    fn emit(&mut self, signal: MovementSignal);
}

impl MovementSink for Vec<MovementSignal> {
    fn emit(&mut self, signal: MovementSignal) {
        self.push(signal);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FollowerState {
    #[default]
    Idle,
    Following {
        remaining: VecDeque<Vec2>,
        /// Waypoint being approached, `None` between waypoints
        current: Option<Vec2>,
    },
}

/// Result of a single follower step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowStep {
    /// Nothing to follow
    Idle,
    /// Emitted a movement signal toward the current waypoint
    Moving,
    /// Reached the current waypoint; the step ends without movement
    Arrived,
    /// The route ran out and an idle signal was emitted
    Finished,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathFollower {
    state: FollowerState,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FollowerState {
        &self.state
    }

    pub fn is_following(&self) -> bool {
        matches!(self.state, FollowerState::Following { .. })
    }

    /// Waypoints not yet reached, including the one being approached
    pub fn remaining_waypoints(&self) -> usize {
        match &self.state {
            FollowerState::Idle => 0,
            FollowerState::Following { remaining, current } => {
                remaining.len() + usize::from(current.is_some())
            }
        }
    }

    /// Replace any run in progress with a new route
    ///
    /// An interrupted run is announced with an idle signal before the new
    /// route takes over; its unvisited waypoints are discarded.
    pub fn start(&mut self, waypoints: Vec<Vec2>, sink: &mut impl MovementSink) {
        self.cancel(sink);
        self.state = FollowerState::Following {
            remaining: waypoints.into(),
            current: None,
        };
    }

    /// Stop following, emitting an idle signal if a run was in progress
    pub fn cancel(&mut self, sink: &mut impl MovementSink) -> bool {
        if !self.is_following() {
            return false;
        }
        self.state = FollowerState::Idle;
        sink.emit(MovementSignal::Idle);
        true
    }

    /// Advance by one fixed tick
    pub fn step(
        &mut self,
        position: Vec2,
        speed: f32,
        arrival_tolerance: f32,
        sink: &mut impl MovementSink,
    ) -> FollowStep {
        if !self.is_following() {
            return FollowStep::Idle;
        }

        let Some(waypoint) = self.current_or_next() else {
            self.state = FollowerState::Idle;
            sink.emit(MovementSignal::Idle);
            return FollowStep::Finished;
        };

        if position.distance(waypoint) > arrival_tolerance {
            sink.emit(MovementSignal::MoveToward {
                waypoint,
                current_position: position,
                speed,
                direction: (waypoint - position).normalize_or_zero(),
            });
            return FollowStep::Moving;
        }

        if let FollowerState::Following { current, .. } = &mut self.state {
            *current = None;
        }
        FollowStep::Arrived
    }

    fn current_or_next(&mut self) -> Option<Vec2> {
        let FollowerState::Following { remaining, current } = &mut self.state else {
            return None;
        };
        if current.is_none() {
            *current = remaining.pop_front();
        }
        *current
    }
}
