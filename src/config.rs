use crate::game_logic::errors::{GunnerError, GunnerResult};
use crate::resources::GameConfig;
use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub mod range_types;

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("gunner");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

pub fn load_config() -> GameConfig {
    match get_config_path() {
        Some(config_path) => load_config_from(&config_path),
        None => {
            warn!("No config directory available, using default settings");
            GameConfig::default()
        }
    }
}

/// Read a config file, falling back to defaults when it is missing or invalid
pub fn load_config_from(path: &Path) -> GameConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return GameConfig::default();
    };

    match toml::from_str::<GameConfig>(&contents) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring invalid config at {}: {e}", path.display());
            GameConfig::default()
        }
    }
}

pub fn save_config(config: &GameConfig) -> GunnerResult<()> {
    let config_path = get_config_path().ok_or(GunnerError::ConfigDirNotFound)?;
    save_config_to(config, &config_path)
}

pub fn save_config_to(config: &GameConfig, path: &Path) -> GunnerResult<()> {
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
