use crate::{components::*, game_logic::calculate_step, plugins::chase::schedule_chase_paths};
use bevy::prelude::*;

/// Distance at which a patrol point counts as reached
const PATROL_ARRIVAL_DISTANCE: f32 = 0.05;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, walk_patrol.before(schedule_chase_paths));
    }
}

fn walk_patrol(mut player_query: Query<(&mut Position, &mut Patrol)>, time: Res<Time>) {
    for (mut position, mut patrol) in player_query.iter_mut() {
        let Some(goal) = patrol.goal() else {
            continue;
        };

        if position.0.distance(goal) <= PATROL_ARRIVAL_DISTANCE {
            patrol.advance();
            continue;
        }

        let step = calculate_step(
            position.0,
            goal,
            goal - position.0,
            patrol.speed.0,
            time.delta_secs(),
        );
        if step.should_move {
            position.0 += step.movement_vector;
        }
    }
}
