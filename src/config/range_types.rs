use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A movement speed value constrained to [0.1, 50.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct MovementSpeed(f32);

impl MovementSpeed {
    const MIN: f32 = 0.1;
    const MAX: f32 = 50.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self::new(3.0)
    }
}

/// A chase trigger distance constrained to [0.5, 100.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct ChaseDistance(f32);

impl ChaseDistance {
    const MIN: f32 = 0.5;
    const MAX: f32 = 100.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ChaseDistance {
    fn default() -> Self {
        Self::new(8.0)
    }
}

/// Number of frames replanning is spread over, constrained to [1, 240]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
pub struct SpreadWindow(u32);

impl SpreadWindow {
    const MIN: u32 = 1;
    const MAX: u32 = 240;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for SpreadWindow {
    fn default() -> Self {
        Self::new(60)
    }
}

/// Seconds between forced path rebuilds, constrained to [0.05, 30.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct RebuildCooldown(f32);

impl RebuildCooldown {
    const MIN: f32 = 0.05;
    const MAX: f32 = 30.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for RebuildCooldown {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// Target displacement forcing an early rebuild, constrained to [0.1, 50.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct TargetMoveThreshold(f32);

impl TargetMoveThreshold {
    const MIN: f32 = 0.1;
    const MAX: f32 = 50.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TargetMoveThreshold {
    fn default() -> Self {
        Self::new(3.0)
    }
}

/// Waypoint arrival tolerance constrained to [0.01, 2.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct ArrivalTolerance(f32);

impl ArrivalTolerance {
    const MIN: f32 = 0.01;
    const MAX: f32 = 2.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ArrivalTolerance {
    fn default() -> Self {
        Self::new(0.2)
    }
}

/// Fixed timestep rate in Hz constrained to [10.0, 240.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct FixedRate(f64);

impl FixedRate {
    const MIN: f64 = 10.0;
    const MAX: f64 = 240.0;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for FixedRate {
    fn default() -> Self {
        Self::new(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_speed_clamping() {
        assert_eq!(MovementSpeed::new(-1.0).get(), 0.1);
        assert_eq!(MovementSpeed::new(0.05).get(), 0.1);
        assert_eq!(MovementSpeed::new(5.0).get(), 5.0);
        assert_eq!(MovementSpeed::new(100.0).get(), 50.0);
    }

    #[test]
    fn test_spread_window_never_zero() {
        assert_eq!(SpreadWindow::new(0).get(), 1);
        assert_eq!(SpreadWindow::new(1000).get(), 240);
    }

    #[test]
    fn test_display() {
        let tolerance = ArrivalTolerance::new(0.25);
        assert_eq!(format!("{tolerance}"), "0.25");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(MovementSpeed::default().get(), 3.0);
        assert_eq!(ChaseDistance::default().get(), 8.0);
        assert_eq!(SpreadWindow::default().get(), 60);
        assert_eq!(RebuildCooldown::default().get(), 2.0);
        assert_eq!(TargetMoveThreshold::default().get(), 3.0);
        assert_eq!(ArrivalTolerance::default().get(), 0.2);
        assert_eq!(FixedRate::default().get(), 50.0);
    }
}
