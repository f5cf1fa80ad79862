use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Integer audio level where 0 mutes the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct VolumeLevel(u8);

impl VolumeLevel {
    pub const MUTED: VolumeLevel = VolumeLevel(0);
    pub const MAX: u8 = 20;
    pub const DEFAULT_MUSIC: VolumeLevel = VolumeLevel(10);
    pub const DEFAULT_SOUNDS: VolumeLevel = VolumeLevel(8);

    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_muted(self) -> bool {
        self.0 == 0
    }

    /// One step louder, saturating at the maximum
    pub fn increased(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One step quieter, saturating at mute
    pub fn decreased(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Level as a fraction of the maximum
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / f32::from(Self::MAX)
    }
}

impl From<u8> for VolumeLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

/// Volume of each audio channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSettings {
    pub music: VolumeLevel,
    pub sounds: VolumeLevel,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            music: VolumeLevel::DEFAULT_MUSIC,
            sounds: VolumeLevel::DEFAULT_SOUNDS,
        }
    }
}
