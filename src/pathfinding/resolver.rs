//! Goal-cell selection for targets standing on blocked cells
//!
//! Half-height colliders such as tables and wall edges can leave the player
//! on a cell the grid marks as blocked even though the cells around it are
//! open. The resolver nudges the goal to a random open neighbour, and as a
//! last resort to one of the room's spawn points.

use super::grid::{CostGrid, GridCell, NEIGHBOR_OFFSETS};
use crate::game_logic::errors::{GunnerError, GunnerResult};
use bevy::prelude::*;
use rand::Rng;

/// Fallback destinations of a room, never empty
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoints(Vec<Vec2>);

impl SpawnPoints {
    /// Rejects an empty list so the fallback can never fail during play
    pub fn new(room: &str, positions: Vec<Vec2>) -> GunnerResult<Self> {
        if positions.is_empty() {
            return Err(GunnerError::EmptySpawnPositions {
                room: room.to_string(),
            });
        }
        Ok(Self(positions))
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uniformly random spawn point
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        self.0[rng.gen_range(0..self.0.len())]
    }
}

/// Goal cell picked for a search, tagged with how it was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// The desired cell itself was open
    Direct(GridCell),
    /// An open cell adjacent to the blocked desired cell
    Neighbor(GridCell),
    /// Every neighbour was blocked, so a spawn point was used instead
    SpawnFallback(GridCell),
}

impl ResolvedTarget {
    pub fn cell(self) -> GridCell {
        match self {
            ResolvedTarget::Direct(cell)
            | ResolvedTarget::Neighbor(cell)
            | ResolvedTarget::SpawnFallback(cell) => cell,
        }
    }
}

/// Pick a traversable goal cell for a world-space target
///
/// Each of the eight neighbours is tried at most once, in random order.
/// Neighbours outside the room count as blocked. The spawn fallback cell is
/// returned without a traversability check; a blocked fallback simply makes
/// the following search fail.
pub fn resolve_reachable_target<R: Rng + ?Sized>(
    desired: Vec2,
    grid: &CostGrid,
    spawn_points: &SpawnPoints,
    rng: &mut R,
) -> ResolvedTarget {
    let desired_cell = grid.world_to_cell(desired);
    if grid.is_traversable(desired_cell) {
        return ResolvedTarget::Direct(desired_cell);
    }

    let mut candidates = NEIGHBOR_OFFSETS.to_vec();
    while !candidates.is_empty() {
        let index = rng.gen_range(0..candidates.len());
        let neighbor = desired_cell.offset(candidates.remove(index));

        if grid.probe(neighbor).is_traversable() {
            debug!("Target cell {desired_cell} blocked, using neighbour {neighbor}");
            return ResolvedTarget::Neighbor(neighbor);
        }
    }

    let fallback = grid.world_to_cell(spawn_points.choose(rng));
    debug!("Target cell {desired_cell} enclosed, falling back to spawn cell {fallback}");
    ResolvedTarget::SpawnFallback(fallback)
}
