use crate::config::range_types::*;
use crate::game_logic::chase::RoomProvider;
use crate::game_logic::{AmmoDetails, HighScores, VolumeSettings};
use crate::pathfinding::{ChaseSettings, CostGrid, SpawnPoints};
use crate::room::RoomSnapshot;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

#[derive(Resource, Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GameConfig {
    pub username: String,
    pub settings: GameSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            username: "Player".to_string(),
            settings: GameSettings::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
// NOTE: When adding new fields, update the defaults below
pub struct GameSettings {
    // Enemy settings
    pub enemy_movement_speed: MovementSpeed,
    pub enemy_count: u32,

    // Chase settings
    pub chase_distance: ChaseDistance,
    pub spread_window: SpreadWindow,
    pub rebuild_cooldown: RebuildCooldown,
    pub target_move_threshold: TargetMoveThreshold,
    pub arrival_tolerance: ArrivalTolerance,

    // Simulation settings
    pub fixed_rate: FixedRate,
    pub rng_seed: Option<u64>, // Fixed seed for reproducible runs, entropy when unset
    pub run_duration_secs: f32,
    pub room_file: Option<String>, // Room file relative to the rooms directory

    // Combat settings
    pub ammo: AmmoDetails,

    // Audio settings
    pub volume: VolumeSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            // Enemy settings
            enemy_movement_speed: MovementSpeed::new(3.0),
            enemy_count: 12,

            // Chase settings
            chase_distance: ChaseDistance::new(8.0),
            spread_window: SpreadWindow::new(60),
            rebuild_cooldown: RebuildCooldown::new(2.0),
            target_move_threshold: TargetMoveThreshold::new(3.0),
            arrival_tolerance: ArrivalTolerance::new(0.2),

            // Simulation settings
            fixed_rate: FixedRate::new(50.0),
            rng_seed: None,
            run_duration_secs: 10.0,
            room_file: None,

            // Combat settings
            ammo: AmmoDetails::default(),

            // Audio settings
            volume: VolumeSettings::default(),
        }
    }
}

impl From<&GameSettings> for ChaseSettings {
    fn from(settings: &GameSettings) -> Self {
        Self {
            chase_distance: settings.chase_distance.get(),
            spread_window: settings.spread_window.get(),
            rebuild_cooldown: settings.rebuild_cooldown.get(),
            target_move_threshold: settings.target_move_threshold.get(),
            arrival_tolerance: settings.arrival_tolerance.get(),
        }
    }
}

/// Navigation data of the room the player is in
#[derive(Resource, Debug, Clone)]
pub struct CurrentRoom(pub RoomSnapshot);

impl RoomProvider for CurrentRoom {
    fn cost_grid(&self) -> &CostGrid {
        &self.0.grid
    }

    fn spawn_points(&self) -> &SpawnPoints {
        &self.0.spawn_points
    }
}

/// Random source for goal resolution and ammo spread
#[derive(Resource, Debug, Clone)]
pub struct ChaseRng(pub Pcg64);

impl ChaseRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(Pcg64::seed_from_u64(seed)),
            None => Self(Pcg64::from_entropy()),
        }
    }
}

/// Score multiplier driven by player ammo hits and misses
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMultiplier(pub u32);

impl ScoreMultiplier {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 30;

    pub fn apply(&mut self, hit: bool) {
        self.0 = if hit {
            (self.0 + 1).min(Self::MAX)
        } else {
            Self::MIN
        };
    }
}

impl Default for ScoreMultiplier {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score(pub u64);

#[derive(Resource, Debug, Clone, Default)]
pub struct HighScoreTable(pub HighScores);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chase_settings_from_game_settings() {
        let mut settings = GameSettings::default();
        settings.spread_window = SpreadWindow::new(12);

        let chase = ChaseSettings::from(&settings);
        assert_eq!(chase.spread_window, 12);
        assert_eq!(chase.chase_distance, 8.0);
        assert_eq!(chase.arrival_tolerance, 0.2);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            username = "ash"

            [settings]
            chase_distance = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(config.username, "ash");
        assert_eq!(config.settings.chase_distance.get(), 12.0);
        assert_eq!(config.settings.spread_window.get(), 60);
        assert_eq!(config.settings.volume.sounds.get(), 8);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;

        let mut a = ChaseRng::from_seed(Some(9));
        let mut b = ChaseRng::from_seed(Some(9));
        assert_eq!(a.0.gen_range(0..1000), b.0.gen_range(0..1000));
    }

    #[test]
    fn test_score_multiplier() {
        let mut multiplier = ScoreMultiplier::default();
        multiplier.apply(true);
        multiplier.apply(true);
        assert_eq!(multiplier.0, 3);

        multiplier.apply(false);
        assert_eq!(multiplier, ScoreMultiplier::default());

        for _ in 0..100 {
            multiplier.apply(true);
        }
        assert_eq!(multiplier.0, ScoreMultiplier::MAX);
    }
}
