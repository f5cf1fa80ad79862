use crate::{
    components::*,
    game_logic::{calculate_step, ChaseAgent, ChaseTick},
    pathfinding::{ChaseMode, ChaseSettings, MovementSignal, MovementSink, SlotAllocator},
    resources::*,
};
use bevy::prelude::*;

/// Hit points every spawned enemy starts with
pub const ENEMY_HEALTH: f32 = 3.0;
/// Seconds between shots of a spawned enemy
pub const ENEMY_FIRE_INTERVAL: f32 = 2.0;

pub struct ChasePlugin;

impl Plugin for ChasePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<SlotAllocator>()
            .init_resource::<ChaseStats>()
            .init_resource::<FixedFrame>()
            .add_event::<MovementToPosition>()
            .add_event::<Idle>()
            .add_systems(Startup, spawn_enemies.run_if(resource_exists::<CurrentRoom>))
            .add_systems(
                FixedUpdate,
                (schedule_chase_paths, apply_movement_events)
                    .chain()
                    .run_if(resource_exists::<CurrentRoom>.and(resource_exists::<ChaseRng>)),
            )
            .add_systems(FixedUpdate, advance_fixed_frame.after(apply_movement_events));
    }
}

/// Number of completed fixed ticks
///
/// Update slots are matched against this counter, so every slot in the
/// spread window comes up regardless of how render frames and fixed ticks
/// interleave.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedFrame(pub u32);

/// Request to move an enemy one tick toward a waypoint
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MovementToPosition {
    pub entity: Entity,
    pub waypoint: Vec2,
    pub current_position: Vec2,
    pub speed: f32,
    pub direction: Vec2,
}

/// An enemy stopped following a path
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Idle {
    pub entity: Entity,
}

/// Running totals reported by the demo
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChaseStats {
    pub replans: u32,
    pub failed_paths: u32,
    pub idle_signals: u32,
    pub active_agents: u32,
}

/// Forwards one agent's signals to the event queues
struct EventSink<'a, 'm, 'i> {
    entity: Entity,
    movement: &'a mut EventWriter<'m, MovementToPosition>,
    idle: &'a mut EventWriter<'i, Idle>,
}

impl MovementSink for EventSink<'_, '_, '_> {
    fn emit(&mut self, signal: MovementSignal) {
        match signal {
            MovementSignal::MoveToward {
                waypoint,
                current_position,
                speed,
                direction,
            } => {
                self.movement.write(MovementToPosition {
                    entity: self.entity,
                    waypoint,
                    current_position,
                    speed,
                    direction,
                });
            }
            MovementSignal::Idle => {
                self.idle.write(Idle {
                    entity: self.entity,
                });
            }
        }
    }
}

/// Spawn one enemy with the next free update slot
pub fn spawn_chaser(
    commands: &mut Commands,
    slots: &mut SlotAllocator,
    position: Vec2,
    settings: &GameSettings,
) -> Entity {
    let slot = slots.next_slot(settings.spread_window.get());
    commands
        .spawn((
            Position(position),
            Enemy::new(
                Speed::new(settings.enemy_movement_speed.get()),
                Distance::new(settings.chase_distance.get()),
            ),
            HealthPool::new_full(ENEMY_HEALTH),
            Gun::new(ENEMY_FIRE_INTERVAL),
            ChaseAgent::new(slot),
        ))
        .id()
}

fn spawn_enemies(
    mut commands: Commands,
    room: Res<CurrentRoom>,
    game_config: Res<GameConfig>,
    mut slots: ResMut<SlotAllocator>,
) {
    let spawn_positions = room.0.spawn_points.positions();
    let count = game_config.settings.enemy_count as usize;

    for position in spawn_positions.iter().cycle().take(count) {
        spawn_chaser(&mut commands, &mut slots, *position, &game_config.settings);
    }

    info!(
        "Spawned {count} enemies across {} spawn points in '{}'",
        spawn_positions.len(),
        room.0.name
    );
}

pub fn schedule_chase_paths(
    frame: Res<FixedFrame>,
    time: Res<Time>,
    room: Res<CurrentRoom>,
    game_config: Res<GameConfig>,
    mut rng: ResMut<ChaseRng>,
    mut stats: ResMut<ChaseStats>,
    target_query: Query<&Position, (With<ChaseTarget>, Without<Enemy>)>,
    mut enemy_query: Query<(Entity, &Position, &Enemy, &mut ChaseAgent)>,
    mut movement_events: EventWriter<MovementToPosition>,
    mut idle_events: EventWriter<Idle>,
) {
    let Ok(target) = target_query.single() else {
        return;
    };

    let base_settings = ChaseSettings::from(&game_config.settings);
    let mut active_agents = 0;

    for (entity, position, enemy, mut agent) in enemy_query.iter_mut() {
        if enemy.is_dying {
            continue;
        }

        let settings = ChaseSettings {
            chase_distance: enemy.chase_distance.0,
            ..base_settings
        };
        let mut sink = EventSink {
            entity,
            movement: &mut movement_events,
            idle: &mut idle_events,
        };

        let outcome = agent.tick(
            ChaseTick {
                frame: frame.0,
                dt: time.delta_secs(),
                agent_position: position.0,
                speed: enemy.speed.0,
                settings: &settings,
            },
            &*room,
            &target.0,
            &mut rng.0,
            &mut sink,
        );

        match outcome.path_found {
            Some(true) => stats.replans += 1,
            Some(false) => {
                stats.replans += 1;
                stats.failed_paths += 1;
            }
            None => {}
        }

        if agent.mode() == ChaseMode::Active {
            active_agents += 1;
        }
    }

    stats.active_agents = active_agents;
}

fn advance_fixed_frame(mut frame: ResMut<FixedFrame>) {
    frame.0 = frame.0.wrapping_add(1);
}

fn apply_movement_events(
    mut movement_events: EventReader<MovementToPosition>,
    mut idle_events: EventReader<Idle>,
    mut position_query: Query<&mut Position, With<Enemy>>,
    mut stats: ResMut<ChaseStats>,
    time: Res<Time>,
) {
    for event in movement_events.read() {
        let Ok(mut position) = position_query.get_mut(event.entity) else {
            continue;
        };

        let step = calculate_step(
            position.0,
            event.waypoint,
            event.direction,
            event.speed,
            time.delta_secs(),
        );
        if step.should_move {
            position.0 += step.movement_vector;
        }
    }

    for event in idle_events.read() {
        trace!("Enemy {} is idle", event.entity);
        stats.idle_signals += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::range_types::SpreadWindow;
    use crate::room::RoomDefinition;
    use bevy::app::TaskPoolPlugin;
    use bevy::time::{TimePlugin, TimeUpdateStrategy};
    use std::time::Duration;

    fn base_app(layout: &str, spread_window: u32) -> App {
        let room = RoomDefinition::from_ascii("test", layout, 1.0, IVec2::ZERO)
            .unwrap()
            .into_snapshot()
            .unwrap();

        let mut config = GameConfig::default();
        config.settings.spread_window = SpreadWindow::new(spread_window);
        config.settings.enemy_count = 0;

        let mut app = App::new();
        app.insert_resource(config)
            .insert_resource(CurrentRoom(room))
            .insert_resource(ChaseRng::from_seed(Some(3)));
        app
    }

    /// App whose fixed schedule is run by hand, one tick per call to `tick`
    fn test_app(layout: &str, spread_window: u32) -> App {
        let mut app = base_app(layout, spread_window);
        app.insert_resource(Time::<()>::default())
            .add_plugins(ChasePlugin);
        app
    }

    /// App driven by `App::update` at 60 Hz with a 50 Hz fixed timestep
    fn timed_app(layout: &str, spread_window: u32) -> App {
        let mut app = base_app(layout, spread_window);
        app.add_plugins((TaskPoolPlugin::default(), TimePlugin))
            .insert_resource(Time::<Fixed>::from_hz(50.0))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
                1.0 / 60.0,
            )))
            .add_plugins(ChasePlugin);
        app
    }

    fn tick(app: &mut App) {
        let world = app.world_mut();
        world
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(20));
        world.run_schedule(FixedUpdate);
    }

    fn spawn_enemy(app: &mut App, position: Vec2, speed: f32, chase_distance: f32) -> Entity {
        app.world_mut()
            .spawn((
                Position(position),
                Enemy::new(Speed::new(speed), Distance::new(chase_distance)),
                ChaseAgent::new(0),
            ))
            .id()
    }

    fn position_of(app: &App, entity: Entity) -> Vec2 {
        app.world().get::<Position>(entity).unwrap().0
    }

    const OPEN_ROOM: &str = "
        ..........
        ..........
        S.........
        ..........
        ..........
    ";

    #[test]
    fn test_enemy_reaches_static_target() {
        let mut app = test_app(OPEN_ROOM, 1);
        let target = Vec2::new(7.5, 2.5);
        app.world_mut().spawn((Position(target), ChaseTarget));
        let enemy = spawn_enemy(&mut app, Vec2::new(1.5, 2.5), 5.0, 10.0);

        for _ in 0..200 {
            tick(&mut app);
        }

        assert!(position_of(&app, enemy).distance(target) < 0.5);
        let stats = *app.world().resource::<ChaseStats>();
        assert!(stats.replans >= 1);
        assert_eq!(stats.failed_paths, 0);
        assert_eq!(stats.active_agents, 1);
    }

    #[test]
    fn test_distant_enemy_stays_dormant() {
        let mut app = test_app(OPEN_ROOM, 1);
        app.world_mut()
            .spawn((Position(Vec2::new(9.5, 4.5)), ChaseTarget));
        let enemy = spawn_enemy(&mut app, Vec2::new(0.5, 0.5), 5.0, 2.0);

        for _ in 0..20 {
            tick(&mut app);
        }

        assert_eq!(position_of(&app, enemy), Vec2::new(0.5, 0.5));
        assert_eq!(*app.world().resource::<ChaseStats>(), ChaseStats::default());
    }

    #[test]
    fn test_walled_off_enemy_goes_idle_once() {
        let mut app = test_app(
            "
            S....#...
            .....#...
            .....#...
            ",
            1,
        );
        app.world_mut()
            .spawn((Position(Vec2::new(7.5, 1.5)), ChaseTarget));
        let enemy = spawn_enemy(&mut app, Vec2::new(1.5, 1.5), 5.0, 10.0);

        tick(&mut app);

        assert_eq!(position_of(&app, enemy), Vec2::new(1.5, 1.5));
        let stats = *app.world().resource::<ChaseStats>();
        assert_eq!(stats.failed_paths, 1);
        assert_eq!(stats.idle_signals, 1);
    }

    #[test]
    fn test_enemies_wait_for_their_slot() {
        let mut app = test_app(OPEN_ROOM, 4);
        app.world_mut()
            .spawn((Position(Vec2::new(7.5, 2.5)), ChaseTarget));
        let enemy = app
            .world_mut()
            .spawn((
                Position(Vec2::new(1.5, 2.5)),
                Enemy::new(Speed::new(5.0), Distance::new(10.0)),
                ChaseAgent::new(3),
            ))
            .id();

        for _ in 0..3 {
            tick(&mut app);
        }
        assert_eq!(position_of(&app, enemy), Vec2::new(1.5, 2.5));
        assert_eq!(app.world().resource::<ChaseStats>().replans, 0);

        tick(&mut app);
        assert_eq!(app.world().resource::<ChaseStats>().replans, 1);
        assert_ne!(position_of(&app, enemy), Vec2::new(1.5, 2.5));
    }

    #[test]
    fn test_no_target_means_no_work() {
        let mut app = test_app(OPEN_ROOM, 1);
        let enemy = spawn_enemy(&mut app, Vec2::new(1.5, 2.5), 5.0, 10.0);

        tick(&mut app);

        assert_eq!(position_of(&app, enemy), Vec2::new(1.5, 2.5));
        assert_eq!(app.world().resource::<ChaseStats>().replans, 0);
    }

    #[test]
    fn test_startup_spawns_enemies_with_spread_slots() {
        let mut app = test_app(OPEN_ROOM, 4);
        app.world_mut()
            .resource_mut::<GameConfig>()
            .settings
            .enemy_count = 6;
        app.world_mut().run_schedule(Startup);

        let world = app.world_mut();
        let mut query = world.query::<(&Position, &ChaseAgent)>();
        assert_eq!(world.query::<(&Enemy, &Gun)>().iter(world).count(), 6);
        let slots: Vec<u32> = query.iter(world).map(|(_, agent)| agent.slot()).collect();
        assert_eq!(slots.len(), 6);
        for slot in 0..4 {
            let per_slot = slots.iter().filter(|s| **s == slot).count();
            assert!(per_slot <= 2, "slot {slot} has {per_slot} agents");
        }

        for (position, _) in query.iter(world) {
            assert_eq!(position.0, Vec2::new(0.5, 2.5));
        }
    }

    #[test]
    fn test_fixed_frame_counts_fixed_ticks() {
        let mut app = test_app(OPEN_ROOM, 1);

        for _ in 0..7 {
            tick(&mut app);
        }

        assert_eq!(*app.world().resource::<FixedFrame>(), FixedFrame(7));
    }

    #[test]
    fn test_every_slot_replans_when_render_and_fixed_rates_differ() {
        let mut app = timed_app(OPEN_ROOM, 6);
        app.world_mut()
            .spawn((Position(Vec2::new(8.5, 2.5)), ChaseTarget));
        let enemies: Vec<Entity> = (0..6)
            .map(|slot| {
                app.world_mut()
                    .spawn((
                        Position(Vec2::new(1.5, 2.5)),
                        Enemy::new(Speed::new(0.5), Distance::new(20.0)),
                        ChaseAgent::new(slot),
                    ))
                    .id()
            })
            .collect();

        for _ in 0..600 {
            app.update();
        }

        assert!(app.world().resource::<FixedFrame>().0 > 6);
        for (slot, enemy) in enemies.into_iter().enumerate() {
            let agent = app.world().get::<ChaseAgent>(enemy).unwrap();
            assert!(
                agent.scheduler().reference().is_some(),
                "agent on slot {slot} never planned a path"
            );
        }
    }
}
