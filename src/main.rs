use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use gunner::components::*;
use gunner::config::load_config;
use gunner::game_logic::{AmmoDetails, ScoreEntry};
use gunner::plugins::*;
use gunner::resources::*;
use std::time::Duration;

fn main() -> AppExit {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
        LogPlugin::default(),
    ));

    let mut game_config = load_config();
    if let Err(e) = game_config.settings.ammo.clone().validated() {
        warn!("{e}, falling back to the default round");
        game_config.settings.ammo = AmmoDetails::default();
    }

    let room = match gunner::load_room(game_config.settings.room_file.as_deref()) {
        Ok(room) => room,
        Err(e) => {
            error!("Failed to set up room: {e}");
            return AppExit::error();
        }
    };

    let volume = &game_config.settings.volume;
    info!(
        "Music volume {}, sound volume {}",
        volume.music.get(),
        volume.sounds.get()
    );

    app.insert_resource(Time::<Fixed>::from_hz(game_config.settings.fixed_rate.get()))
        .insert_resource(ChaseRng::from_seed(game_config.settings.rng_seed))
        .insert_resource(CurrentRoom(room))
        .insert_resource(game_config)
        .init_resource::<HighScoreTable>()
        .add_plugins((ChasePlugin, CombatPlugin, PlayerPlugin))
        .add_systems(Startup, spawn_player)
        .add_systems(Update, finish_run)
        .run()
}

fn spawn_player(mut commands: Commands, room: Res<CurrentRoom>, game_config: Res<GameConfig>) {
    let route = room.0.patrol_route();
    let start = route
        .last()
        .copied()
        .unwrap_or_else(|| room.0.grid.cell_center(room.0.grid.world_to_cell(Vec2::ZERO)));
    let speed = Speed::new(game_config.settings.enemy_movement_speed.get() * 1.2);

    info!(
        "{} patrols {} waypoints from {start}",
        game_config.username,
        route.len()
    );

    commands.spawn((
        Position(start),
        ChaseTarget,
        HealthPool::new_full(10.0),
        Patrol::new(route, speed),
        Gun::new(0.5),
    ));
}

fn finish_run(
    time: Res<Time>,
    game_config: Res<GameConfig>,
    room: Res<CurrentRoom>,
    stats: Res<ChaseStats>,
    score: Res<Score>,
    mut high_scores: ResMut<HighScoreTable>,
    mut exit: EventWriter<AppExit>,
    mut finished: Local<bool>,
) {
    if *finished || time.elapsed_secs() < game_config.settings.run_duration_secs {
        return;
    }
    *finished = true;

    info!(
        "Run over: {} replans, {} failed, {} idle signals, {} enemies chasing",
        stats.replans, stats.failed_paths, stats.idle_signals, stats.active_agents
    );

    let entry = ScoreEntry::new(&game_config.username, &room.0.name, score.0);
    match high_scores.0.submit(entry) {
        Some(rank) => info!("Score {} ranked #{rank}", score.0),
        None => info!("Score {} did not make the table", score.0),
    }

    exit.write(AppExit::Success);
}
