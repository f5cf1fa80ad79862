use bevy::prelude::*;
use derive_more::{Add, Display, From, Mul};
use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Mul, Display, From)]
pub struct Speed(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Add, Mul, Display, From)]
pub struct Distance(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Add, Mul, Display, From)]
pub struct Damage(pub f32);

impl Speed {
    pub fn new(value: f32) -> Self { Self(value.max(0.0)) }
    pub const ZERO: Speed = Speed(0.0);
}

impl Distance {
    pub fn new(value: f32) -> Self { Self(value.max(0.0)) }
    pub const ZERO: Distance = Distance(0.0);
}

impl Damage {
    pub fn new(value: f32) -> Self { Self(value.max(0.0)) }
    pub const ZERO: Damage = Damage(0.0);
}

impl Sub for Distance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output { Self((self.0 - rhs.0).max(0.0)) }
}

impl Sub for Damage {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output { Self((self.0 - rhs.0).max(0.0)) }
}

impl std::ops::Mul<Speed> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: Speed) -> Self::Output { self * rhs.0 }
}

impl PartialOrd<f32> for Distance {
    fn partial_cmp(&self, other: &f32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl PartialEq<f32> for Distance {
    fn eq(&self, other: &f32) -> bool { self.0 == *other }
}

/// World position on the room floor
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

/// The entity enemies chase, normally the player
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ChaseTarget;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub speed: Speed,
    /// Overrides the configured chase distance for this enemy
    pub chase_distance: Distance,
    pub is_dying: bool,
}

impl Enemy {
    pub fn new(speed: Speed, chase_distance: Distance) -> Self {
        Self {
            speed,
            chase_distance,
            is_dying: false,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HealthPool {
    pub current: f32,
    pub max: f32,
}

impl HealthPool {
    pub fn new(current: f32, max: f32) -> Self {
        Self {
            current: current.max(0.0).min(max),
            max: max.max(0.0),
        }
    }

    pub fn new_full(max: f32) -> Self {
        Self::new(max, max)
    }

    pub fn is_dead(self) -> bool { self.current <= 0.0 }

    pub fn percentage(self) -> f32 {
        if self.max > 0.0 { self.current / self.max } else { 0.0 }
    }

    pub fn take_damage(&mut self, damage: Damage) {
        self.current = (self.current - damage.0).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

impl std::fmt::Display for HealthPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}/{:.0}", self.current, self.max)
    }
}

/// Scripted loop of world positions, walked in order
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Patrol {
    pub waypoints: Vec<Vec2>,
    pub next: usize,
    pub speed: Speed,
}

impl Patrol {
    pub fn new(waypoints: Vec<Vec2>, speed: Speed) -> Self {
        Self {
            waypoints,
            next: 0,
            speed,
        }
    }

    /// Current goal, `None` for an empty route
    pub fn goal(&self) -> Option<Vec2> {
        self.waypoints.get(self.next).copied()
    }

    pub fn advance(&mut self) {
        if !self.waypoints.is_empty() {
            self.next = (self.next + 1) % self.waypoints.len();
        }
    }
}

/// Fire interval of the chase target or an armed enemy
#[derive(Component, Debug, Clone)]
pub struct Gun {
    pub cooldown: Timer,
}

impl Gun {
    pub fn new(interval_secs: f32) -> Self {
        Self {
            cooldown: Timer::from_seconds(interval_secs, TimerMode::Repeating),
        }
    }
}
