pub mod chase;
pub mod combat;
pub mod player;

pub use chase::*;
pub use combat::*;
pub use player::*;
