use crate::{components::*, game_logic::*, resources::*};
use bevy::prelude::*;

/// Radius within which ammo strikes an enemy or the player
pub const AMMO_COLLISION_DISTANCE: f32 = 0.4;
/// Base points for a kill, scaled by the current multiplier
pub const SCORE_PER_ENEMY: u64 = 100;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<ScoreMultiplier>()
            .init_resource::<Score>()
            .add_event::<FireAmmo>()
            .add_event::<MultiplierEvent>()
            .add_systems(
                FixedUpdate,
                (
                    auto_fire,
                    enemy_fire,
                    fire_ammo,
                    update_ammo,
                    apply_multiplier_events,
                )
                    .chain()
                    .run_if(resource_exists::<CurrentRoom>.and(resource_exists::<ChaseRng>)),
            );
    }
}

/// Request to spawn one piece of ammo
///
/// The chase target's gun sends player ammo at enemies; armed enemies send
/// enemy ammo at the chase target.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FireAmmo {
    pub origin: Vec2,
    /// Shooter's aim angle in degrees
    pub aim_angle: f32,
    /// Weapon's aim angle in degrees
    pub weapon_aim_angle: f32,
    /// Vector from the weapon to the aim point
    pub weapon_aim_direction: Vec2,
    pub is_player_ammo: bool,
}

/// Player ammo resolved as a hit or a miss
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplierEvent {
    pub hit: bool,
}

fn auto_fire(
    time: Res<Time>,
    mut shooter_query: Query<(&Position, &mut Gun), (With<ChaseTarget>, Without<Enemy>)>,
    enemy_query: Query<(&Position, &Enemy)>,
    mut fire_events: EventWriter<FireAmmo>,
) {
    for (position, mut gun) in shooter_query.iter_mut() {
        if !gun.cooldown.tick(time.delta()).just_finished() {
            continue;
        }

        let nearest = enemy_query
            .iter()
            .filter(|(_, enemy)| !enemy.is_dying)
            .map(|(enemy_position, _)| enemy_position.0)
            .min_by(|a, b| {
                a.distance_squared(position.0)
                    .total_cmp(&b.distance_squared(position.0))
            });

        let Some(enemy_position) = nearest else {
            continue;
        };

        let aim = enemy_position - position.0;
        let angle = aim.y.atan2(aim.x).to_degrees();
        fire_events.write(FireAmmo {
            origin: position.0,
            aim_angle: angle,
            weapon_aim_angle: angle,
            weapon_aim_direction: aim,
            is_player_ammo: true,
        });
    }
}

fn enemy_fire(
    time: Res<Time>,
    game_config: Res<GameConfig>,
    mut shooter_query: Query<(&Position, &Enemy, &mut Gun), Without<ChaseTarget>>,
    target_query: Query<&Position, (With<ChaseTarget>, Without<Enemy>)>,
    mut fire_events: EventWriter<FireAmmo>,
) {
    let Ok(target) = target_query.single() else {
        return;
    };

    for (position, enemy, mut gun) in shooter_query.iter_mut() {
        if !gun.cooldown.tick(time.delta()).just_finished() || enemy.is_dying {
            continue;
        }

        let aim = target.0 - position.0;
        if aim.length() > game_config.settings.ammo.range {
            continue;
        }

        let angle = aim.y.atan2(aim.x).to_degrees();
        fire_events.write(FireAmmo {
            origin: position.0,
            aim_angle: angle,
            weapon_aim_angle: angle,
            weapon_aim_direction: aim,
            is_player_ammo: false,
        });
    }
}

fn fire_ammo(
    mut commands: Commands,
    mut fire_events: EventReader<FireAmmo>,
    game_config: Res<GameConfig>,
    mut rng: ResMut<ChaseRng>,
) {
    for event in fire_events.read() {
        let details = AmmoDetails {
            is_player_ammo: event.is_player_ammo,
            ..game_config.settings.ammo.clone()
        };

        let angle = fire_direction_angle(
            &details,
            event.aim_angle,
            event.weapon_aim_angle,
            event.weapon_aim_direction,
            &mut rng.0,
        );

        commands.spawn((
            Position(event.origin),
            AmmoFlight::new(&details, angle, details.speed, false),
        ));
    }
}

fn update_ammo(
    mut commands: Commands,
    time: Res<Time>,
    room: Res<CurrentRoom>,
    multiplier: Res<ScoreMultiplier>,
    mut score: ResMut<Score>,
    mut ammo_query: Query<(Entity, &mut Position, &mut AmmoFlight)>,
    mut enemy_query: Query<(Entity, &Position, &mut HealthPool, &mut Enemy), Without<AmmoFlight>>,
    mut target_query: Query<
        (&Position, &mut HealthPool),
        (With<ChaseTarget>, Without<Enemy>, Without<AmmoFlight>),
    >,
    mut multiplier_events: EventWriter<MultiplierEvent>,
) {
    let grid = &room.0.grid;

    for (ammo_entity, mut position, mut ammo) in ammo_query.iter_mut() {
        match ammo.advance(time.delta_secs()) {
            AmmoStep::Charging | AmmoStep::Held => continue,
            AmmoStep::Expired { multiplier } => {
                if let Some(hit) = multiplier {
                    multiplier_events.write(MultiplierEvent { hit });
                }
                commands.entity(ammo_entity).despawn();
                continue;
            }
            AmmoStep::Flying(displacement) => position.0 += displacement,
        }

        let report = if !grid.is_traversable(grid.world_to_cell(position.0)) {
            ammo.register_hit(Struck::Scenery)
        } else if ammo.is_player_ammo() {
            let Some((enemy_entity, _, mut health, mut enemy)) =
                enemy_query.iter_mut().find(|(_, enemy_position, _, enemy)| {
                    !enemy.is_dying
                        && enemy_position.0.distance(position.0) <= AMMO_COLLISION_DISTANCE
                })
            else {
                continue;
            };

            let report = ammo.register_hit(Struck::Enemy);
            if let Some(damage) = report.and_then(|report| report.damage) {
                health.take_damage(Damage::new(damage));
                if health.is_dead() {
                    enemy.is_dying = true;
                    score.0 += SCORE_PER_ENEMY * u64::from(multiplier.0);
                    debug!("Enemy {enemy_entity} killed, score now {}", score.0);
                    commands.entity(enemy_entity).despawn();
                }
            }
            report
        } else {
            let Some((_, mut health)) = target_query
                .iter_mut()
                .find(|(target_position, _)| {
                    target_position.0.distance(position.0) <= AMMO_COLLISION_DISTANCE
                })
            else {
                continue;
            };

            let report = ammo.register_hit(Struck::Damageable);
            if let Some(damage) = report.and_then(|report| report.damage) {
                health.take_damage(Damage::new(damage));
            }
            report
        };

        if let Some(report) = report {
            if let Some(hit) = report.multiplier {
                multiplier_events.write(MultiplierEvent { hit });
            }
            commands.entity(ammo_entity).despawn();
        }
    }
}

fn apply_multiplier_events(
    mut multiplier_events: EventReader<MultiplierEvent>,
    mut multiplier: ResMut<ScoreMultiplier>,
) {
    for event in multiplier_events.read() {
        multiplier.apply(event.hit);
    }
}
