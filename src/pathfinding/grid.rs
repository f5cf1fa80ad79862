//! Per-room navigation cost grid
//!
//! A room owns two parallel layers over its cells: the movement penalty baked
//! from the tilemap and an item obstacle layer for furniture and other props.
//! The effective cost of a cell is the minimum of both layers, and a cell with
//! an effective cost of zero cannot be entered.

use crate::game_logic::errors::{GunnerError, GunnerResult};
use bevy::prelude::*;
use std::f32::consts::SQRT_2;

/// Movement penalty assigned to open floor when a room does not specify one
pub const DEFAULT_MOVEMENT_PENALTY: u8 = 1;

/// Penalty marking a cell as impassable
pub const BLOCKED_PENALTY: u8 = 0;

/// Item layer value for a cell with no item on it
pub const ITEM_LAYER_CLEAR: u8 = u8::MAX;

/// Offsets of the eight cells surrounding a cell
pub const NEIGHBOR_OFFSETS: [IVec2; 8] = [
    IVec2::new(-1, -1),
    IVec2::new(-1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, -1),
    IVec2::new(0, 1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
];

/// Cell coordinates relative to the room's lower bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, offset: IVec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }

    /// Number of 8-connected steps between two cells
    pub fn chebyshev_distance(self, other: GridCell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Octile distance, the exact unit-cost distance on an 8-connected grid
    pub fn octile_distance(self, other: GridCell) -> f32 {
        let dx = self.x.abs_diff(other.x) as f32;
        let dy = self.y.abs_diff(other.y) as f32;
        let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
        (long - short) + short * SQRT_2
    }

    /// True when the two cells differ on both axes
    pub fn is_diagonal_to(self, other: GridCell) -> bool {
        self.x != other.x && self.y != other.y
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Outcome of a bounds-checked cell lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellProbe {
    Traversable { cost: u8 },
    Blocked,
    OutOfBounds,
}

impl CellProbe {
    pub fn is_traversable(self) -> bool {
        matches!(self, CellProbe::Traversable { .. })
    }

    pub fn cost(self) -> Option<u8> {
        match self {
            CellProbe::Traversable { cost } => Some(cost),
            CellProbe::Blocked | CellProbe::OutOfBounds => None,
        }
    }
}

/// Navigation costs for a single room
///
/// The grid is built once when a room is set up and is read-only while
/// agents search it.
#[derive(Debug, Clone, PartialEq)]
pub struct CostGrid {
    width: u32,
    height: u32,
    /// World-space cell coordinate of local cell (0, 0)
    lower_bounds: IVec2,
    /// World units per cell edge
    cell_size: f32,
    movement_penalty: Vec<u8>,
    item_obstacles: Vec<u8>,
}

impl CostGrid {
    /// Build a grid from explicit layers
    ///
    /// When no item layer is supplied every cell starts clear, so only the
    /// penalty layer decides traversability.
    pub fn new(
        width: u32,
        height: u32,
        lower_bounds: IVec2,
        cell_size: f32,
        movement_penalty: Vec<u8>,
        item_obstacles: Option<Vec<u8>>,
    ) -> GunnerResult<Self> {
        if width == 0 || height == 0 {
            return Err(GunnerError::RoomValidationFailed {
                reason: format!("grid dimensions must be non-zero, got {width}x{height}"),
            });
        }

        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GunnerError::RoomValidationFailed {
                reason: format!("cell size must be positive, got {cell_size}"),
            });
        }

        let expected = width as usize * height as usize;
        if movement_penalty.len() != expected {
            return Err(GunnerError::GridDimensionMismatch {
                layer: "movement_penalty",
                expected,
                actual: movement_penalty.len(),
            });
        }

        let item_obstacles = match item_obstacles {
            Some(layer) if layer.len() != expected => {
                return Err(GunnerError::GridDimensionMismatch {
                    layer: "item_obstacles",
                    expected,
                    actual: layer.len(),
                });
            }
            Some(layer) => layer,
            None => vec![ITEM_LAYER_CLEAR; expected],
        };

        Ok(Self {
            width,
            height,
            lower_bounds,
            cell_size,
            movement_penalty,
            item_obstacles,
        })
    }

    /// Obstacle-free grid with the default penalty, unit cells and origin at zero
    pub fn open(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            lower_bounds: IVec2::ZERO,
            cell_size: 1.0,
            movement_penalty: vec![DEFAULT_MOVEMENT_PENALTY; cells],
            item_obstacles: vec![ITEM_LAYER_CLEAR; cells],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn lower_bounds(&self) -> IVec2 {
        self.lower_bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.movement_penalty.len()
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        let x = u32::try_from(cell.x).ok()?;
        let y = u32::try_from(cell.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Dense row-major index of an in-bounds cell
    pub fn dense_index(&self, cell: GridCell) -> Option<usize> {
        self.index(cell)
    }

    /// Bounds-checked lookup; cells outside the room are never an error
    pub fn probe(&self, cell: GridCell) -> CellProbe {
        let Some(index) = self.index(cell) else {
            return CellProbe::OutOfBounds;
        };

        let cost = self.movement_penalty[index].min(self.item_obstacles[index]);
        if cost == BLOCKED_PENALTY {
            CellProbe::Blocked
        } else {
            CellProbe::Traversable { cost }
        }
    }

    pub fn is_traversable(&self, cell: GridCell) -> bool {
        self.probe(cell).is_traversable()
    }

    /// Combined penalty of both layers, `None` outside the room
    pub fn cost_of(&self, cell: GridCell) -> Option<u8> {
        self.index(cell)
            .map(|index| self.movement_penalty[index].min(self.item_obstacles[index]))
    }

    /// Set the tilemap penalty of a cell, returns false outside the room
    pub fn set_movement_penalty(&mut self, cell: GridCell, penalty: u8) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        self.movement_penalty[index] = penalty;
        true
    }

    /// Mark or clear an item obstacle, returns false outside the room
    ///
    /// Clearing leaves the movement penalty as the cell's only cost.
    pub fn set_item_obstacle(&mut self, cell: GridCell, blocked: bool) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        self.item_obstacles[index] = if blocked {
            BLOCKED_PENALTY
        } else {
            ITEM_LAYER_CLEAR
        };
        true
    }

    /// Room-local cell containing a world position
    ///
    /// The result may lie outside the room; probe it before use.
    pub fn world_to_cell(&self, world: Vec2) -> GridCell {
        let world_cell = (world / self.cell_size).floor().as_ivec2();
        let local = world_cell - self.lower_bounds;
        GridCell::new(local.x, local.y)
    }

    /// World-space center of a room-local cell
    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        let world_cell = IVec2::new(cell.x, cell.y) + self.lower_bounds;
        (world_cell.as_vec2() + Vec2::splat(0.5)) * self.cell_size
    }

    /// Every cell of the room in row-major order
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| GridCell::new(x, y)))
    }

    pub fn traversable_count(&self) -> usize {
        self.cells().filter(|cell| self.is_traversable(*cell)).count()
    }
}
