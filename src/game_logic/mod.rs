pub mod ammo;
pub mod chase;
pub mod errors;
pub mod high_scores;
pub mod movement;
pub mod volume;

pub use ammo::*;
pub use chase::*;
pub use high_scores::*;
pub use movement::*;
pub use volume::*;
