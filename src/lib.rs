pub mod components;
pub mod config;
pub mod game_logic;
pub mod pathfinding;
pub mod plugins;
pub mod resources;
pub mod room;

// Selective re-exports for external consumers

// Plugins - main.rs needs all plugins
pub use plugins::*;

// Game logic - binaries need errors and the chase core
pub use game_logic::errors::{GunnerError, GunnerResult};
pub use game_logic::{ChaseAgent, RoomProvider, TargetProvider};

// Room - binaries need room loading
pub use room::{load_room, RoomDefinition, RoomSnapshot};
