use bevy::prelude::*;

/// Pure movement calculation logic that can be tested without Bevy runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementCalculation {
    pub movement_vector: Vec2,
    pub should_move: bool,
    pub distance_to_target: f32,
}

impl MovementCalculation {
    const NONE: Self = Self {
        movement_vector: Vec2::ZERO,
        should_move: false,
        distance_to_target: 0.0,
    };
}

/// Displacement for one fixed tick of a move-toward signal
///
/// Moves along `direction` at `speed` and never past the waypoint, so an
/// agent lands exactly on it instead of oscillating around it.
pub fn calculate_step(
    current_position: Vec2,
    waypoint: Vec2,
    direction: Vec2,
    speed: f32,
    delta_time: f32,
) -> MovementCalculation {
    if !speed.is_finite() || speed <= 0.0 || delta_time <= 0.0 {
        return MovementCalculation::NONE;
    }

    let distance = current_position.distance(waypoint);
    let direction = direction.normalize_or_zero();
    if distance <= f32::EPSILON || direction == Vec2::ZERO {
        return MovementCalculation {
            distance_to_target: distance,
            ..MovementCalculation::NONE
        };
    }

    let max_move_distance = speed * delta_time;
    let clamped_move_distance = max_move_distance.min(distance);

    MovementCalculation {
        movement_vector: direction * clamped_move_distance,
        should_move: true,
        distance_to_target: distance,
    }
}

/// Validate a world position before it is used as a target or waypoint
pub fn validate_position(position: Vec2) -> bool {
    position.is_finite() && position.length() < 100_000.0
}
