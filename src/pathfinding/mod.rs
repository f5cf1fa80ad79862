//! Grid navigation for chasing enemies
//!
//! The cost grid describes one room, the search engine turns two cells into a
//! waypoint route, the resolver picks a reachable goal cell, and the scheduler
//! and follower decide when to plan and how to walk the result.

pub mod follower;
pub mod grid;
pub mod resolver;
pub mod scheduler;
pub mod search;

pub use follower::*;
pub use grid::*;
pub use resolver::*;
pub use scheduler::*;
pub use search::*;
