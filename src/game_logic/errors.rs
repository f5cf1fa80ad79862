use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum GunnerError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Failed to access file system: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    // Room-related errors
    #[error("Room file not found at path: {path}")]
    RoomFileNotFound { path: PathBuf },

    #[error("Corrupted room file: {reason}")]
    CorruptedRoomFile { reason: String },

    #[error("Room validation failed: {reason}")]
    RoomValidationFailed { reason: String },

    #[error("Grid layer '{layer}' has {actual} cells, expected {expected}")]
    GridDimensionMismatch {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Room '{room}' has no spawn positions to fall back to")]
    EmptySpawnPositions { room: String },

    // Command-line errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // Gameplay data errors
    #[error("Invalid ammo details: {reason}")]
    InvalidAmmoDetails { reason: String },
}

/// Result type alias for all operations
pub type GunnerResult<T> = Result<T, GunnerError>;
