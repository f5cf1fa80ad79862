//! A* search over a room's cost grid

use super::grid::{CostGrid, GridCell, NEIGHBOR_OFFSETS};
use bevy::prelude::*;
use pathfinding::prelude::astar;
use std::f32::consts::SQRT_2;

/// Route produced by a single search
///
/// Waypoints run from the first cell after the start to the goal, in
/// traversal order. The start cell is never included because the agent is
/// already standing in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    cells: Vec<GridCell>,
    waypoints: Vec<Vec2>,
    cost: f32,
}

impl Path {
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Accumulated movement cost from the start cell to the goal
    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn final_destination(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    pub fn into_waypoints(self) -> Vec<Vec2> {
        self.waypoints
    }
}

/// Fixed-point scale of search costs, so one unit-penalty straight step costs 1000
pub const COST_SCALE: u32 = 1000;

/// Scaled cost of entering a cell with `penalty`
///
/// Rounded diagonal costs never fall below the heuristic's diagonal weight,
/// which keeps the octile estimate admissible.
fn step_cost(penalty: u8, diagonal: bool) -> u32 {
    let straight = f32::from(penalty) * COST_SCALE as f32;
    if diagonal {
        (straight * SQRT_2).round() as u32
    } else {
        straight as u32
    }
}

/// Scaled octile distance for unit penalties
fn heuristic(cell: GridCell, goal: GridCell) -> u32 {
    let dx = cell.x.abs_diff(goal.x);
    let dy = cell.y.abs_diff(goal.y);
    let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
    (long - short) * step_cost(1, false) + short * step_cost(1, true)
}

/// Find the cheapest 8-connected route between two cells of a room
///
/// Entering a cell costs its penalty, scaled by √2 for diagonal steps.
/// Returns `None` when either end is not traversable or the goal cannot be
/// reached; callers treat that as "stay idle".
///
/// Among open nodes with the same estimated total, the one with the larger
/// accumulated cost (so the smaller remaining estimate) is expanded first.
/// Remaining ties follow the search's binary heap, which is deterministic for
/// identical inputs.
pub fn find_path(grid: &CostGrid, start: GridCell, goal: GridCell) -> Option<Path> {
    if !grid.is_traversable(start) || !grid.is_traversable(goal) {
        debug!(
            "Pathfinding rejected: start {start} traversable={}, goal {goal} traversable={}",
            grid.is_traversable(start),
            grid.is_traversable(goal)
        );
        return None;
    }

    let Some((mut cells, cost)) = astar(
        &start,
        |cell| {
            let current = *cell;
            let neighbors: Vec<_> = NEIGHBOR_OFFSETS
                .iter()
                .filter_map(|offset| {
                    let neighbor = current.offset(*offset);
                    let penalty = grid.probe(neighbor).cost()?;
                    Some((neighbor, step_cost(penalty, current.is_diagonal_to(neighbor))))
                })
                .collect();
            neighbors
        },
        |cell| heuristic(*cell, goal),
        |cell| *cell == goal,
    ) else {
        debug!("Pathfinding found no route from {start} to {goal}");
        return None;
    };

    // The agent already occupies the start cell
    cells.remove(0);

    let waypoints = cells.iter().map(|cell| grid.cell_center(*cell)).collect();

    Some(Path {
        cells,
        waypoints,
        cost: cost as f32 / COST_SCALE as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::grid::BLOCKED_PENALTY;
    use pathfinding::prelude::bfs;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn walled_grid(width: u32, height: u32, walls: &[GridCell]) -> CostGrid {
        let mut grid = CostGrid::open(width, height);
        for wall in walls {
            grid.set_movement_penalty(*wall, BLOCKED_PENALTY);
        }
        grid
    }

    fn bfs_steps(grid: &CostGrid, start: GridCell, goal: GridCell) -> Option<usize> {
        bfs(
            &start,
            |cell| {
                NEIGHBOR_OFFSETS
                    .iter()
                    .map(|offset| cell.offset(*offset))
                    .filter(|neighbor| grid.is_traversable(*neighbor))
                    .collect::<Vec<_>>()
            },
            |cell| *cell == goal,
        )
        .map(|route| route.len() - 1)
    }

    #[test]
    fn test_empty_grid_corner_to_corner_is_diagonal() {
        let grid = CostGrid::open(5, 5);

        let path = find_path(&grid, GridCell::new(0, 0), GridCell::new(4, 4))
            .expect("open grid should always have a path");

        assert_eq!(path.len(), 4);
        assert_eq!(
            path.cells(),
            &[
                GridCell::new(1, 1),
                GridCell::new(2, 2),
                GridCell::new(3, 3),
                GridCell::new(4, 4)
            ]
        );
        assert!((path.cost() - 4.0 * SQRT_2).abs() < 1e-2);
        assert_eq!(path.final_destination(), Some(Vec2::new(4.5, 4.5)));
    }

    #[test]
    fn test_step_count_matches_chebyshev_on_open_grid() {
        let grid = CostGrid::open(9, 7);
        let mut rng = Pcg64::seed_from_u64(7);

        for _ in 0..200 {
            let start = GridCell::new(rng.gen_range(0..9), rng.gen_range(0..7));
            let goal = GridCell::new(rng.gen_range(0..9), rng.gen_range(0..7));

            let path = find_path(&grid, start, goal).expect("open grid is connected");

            assert_eq!(path.len() as u32, start.chebyshev_distance(goal));
            assert!(
                (path.cost() - start.octile_distance(goal)).abs() < 1e-2,
                "cost {} differs from optimal {} for {start} -> {goal}",
                path.cost(),
                start.octile_distance(goal)
            );
        }
    }

    #[test]
    fn test_first_waypoint_is_never_the_start_cell() {
        let grid = CostGrid::open(6, 6);
        let start = GridCell::new(2, 3);

        for goal in grid.cells().filter(|cell| *cell != start) {
            let path = find_path(&grid, start, goal).unwrap();
            assert_ne!(path.cells()[0], start);
            assert_ne!(path.waypoints()[0], grid.cell_center(start));
            assert_eq!(path.cells()[0].chebyshev_distance(start), 1);
        }
    }

    #[test]
    fn test_start_equal_to_goal_yields_empty_path() {
        let grid = CostGrid::open(3, 3);
        let path = find_path(&grid, GridCell::new(1, 1), GridCell::new(1, 1)).unwrap();

        assert!(path.is_empty());
        assert_eq!(path.cost(), 0.0);
    }

    #[test]
    fn test_solid_wall_means_no_path() {
        let wall: Vec<GridCell> = (0..5).map(|y| GridCell::new(2, y)).collect();
        let grid = walled_grid(5, 5, &wall);

        assert!(find_path(&grid, GridCell::new(0, 2), GridCell::new(4, 2)).is_none());
    }

    #[test]
    fn test_enclosed_goal_is_unreachable() {
        let goal = GridCell::new(3, 3);
        let ring: Vec<GridCell> = NEIGHBOR_OFFSETS.iter().map(|o| goal.offset(*o)).collect();
        let grid = walled_grid(7, 7, &ring);

        assert!(grid.is_traversable(goal));
        assert!(find_path(&grid, GridCell::new(0, 0), goal).is_none());
    }

    #[test]
    fn test_blocked_or_outside_endpoints_yield_none() {
        let grid = walled_grid(4, 4, &[GridCell::new(1, 1)]);

        assert!(find_path(&grid, GridCell::new(1, 1), GridCell::new(3, 3)).is_none());
        assert!(find_path(&grid, GridCell::new(0, 0), GridCell::new(1, 1)).is_none());
        assert!(find_path(&grid, GridCell::new(-1, 0), GridCell::new(3, 3)).is_none());
        assert!(find_path(&grid, GridCell::new(0, 0), GridCell::new(4, 0)).is_none());
    }

    #[test]
    fn test_detours_around_high_penalty_cells() {
        let mut grid = CostGrid::open(5, 3);
        for x in 1..=3 {
            grid.set_movement_penalty(GridCell::new(x, 1), 10);
        }

        let path = find_path(&grid, GridCell::new(0, 1), GridCell::new(4, 1)).unwrap();

        assert!((path.cost() - (2.0 + 2.0 * SQRT_2)).abs() < 1e-2);
        for cell in &path.cells()[..path.len() - 1] {
            assert_ne!(cell.y, 1, "path should avoid the expensive middle row");
        }
    }

    #[test]
    fn test_identical_inputs_give_identical_paths() {
        let grid = walled_grid(8, 8, &[GridCell::new(4, 3), GridCell::new(4, 4)]);
        let start = GridCell::new(0, 4);
        let goal = GridCell::new(7, 4);

        let first = find_path(&grid, start, goal).unwrap();
        for _ in 0..10 {
            assert_eq!(find_path(&grid, start, goal).unwrap(), first);
        }
    }

    #[test]
    fn test_reachability_agrees_with_breadth_first_search() {
        let mut rng = Pcg64::seed_from_u64(42);

        for _ in 0..50 {
            let mut grid = CostGrid::open(12, 12);
            for cell in grid.cells().collect::<Vec<_>>() {
                if rng.gen_bool(0.3) {
                    grid.set_movement_penalty(cell, BLOCKED_PENALTY);
                } else {
                    grid.set_movement_penalty(cell, rng.gen_range(1..=4));
                }
            }

            let start = GridCell::new(rng.gen_range(0..12), rng.gen_range(0..12));
            let goal = GridCell::new(rng.gen_range(0..12), rng.gen_range(0..12));
            if !grid.is_traversable(start) || !grid.is_traversable(goal) {
                assert!(find_path(&grid, start, goal).is_none());
                continue;
            }

            let expected = bfs_steps(&grid, start, goal);
            let actual = find_path(&grid, start, goal);

            assert_eq!(actual.is_some(), expected.is_some());
            if let (Some(path), Some(min_steps)) = (actual, expected) {
                assert!(path.len() >= min_steps);
                assert!(path.cost() + 1e-2 >= start.octile_distance(goal));
                for cell in path.cells() {
                    assert!(grid.is_traversable(*cell));
                }
                for pair in path.cells().windows(2) {
                    assert_eq!(pair[0].chebyshev_distance(pair[1]), 1);
                }
            }
        }
    }

    #[test]
    fn test_scaled_costs_keep_heuristic_admissible() {
        assert_eq!(step_cost(1, false), COST_SCALE);
        assert_eq!(step_cost(1, true), 1414);
        assert_eq!(step_cost(3, false), 3000);

        for penalty in 1..=u8::MAX {
            assert!(step_cost(penalty, true) >= u32::from(penalty) * step_cost(1, true));
        }

        let origin = GridCell::new(0, 0);
        assert_eq!(heuristic(origin, GridCell::new(3, 1)), 2000 + 1414);
        assert_eq!(heuristic(origin, origin), 0);
    }

    #[test]
    fn test_reported_cost_is_unscaled() {
        let grid = CostGrid::open(4, 1);
        let path = find_path(&grid, GridCell::new(0, 0), GridCell::new(3, 0)).unwrap();

        assert_eq!(path.cost(), 3.0);
        assert_eq!(path.cells(), &[GridCell::new(1, 0), GridCell::new(2, 0), GridCell::new(3, 0)]);
    }
}
