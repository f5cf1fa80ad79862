use crate::game_logic::errors::{GunnerError, GunnerResult};
use crate::pathfinding::{
    find_path, CostGrid, SpawnPoints, BLOCKED_PENALTY, DEFAULT_MOVEMENT_PENALTY, ITEM_LAYER_CLEAR,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Layout used when no room file is configured
pub const DEMO_ROOM_LAYOUT: &str = "
    ####################
    #S.......##.......S#
    #........##........#
    #..oo....22....oo..#
    #..oo..........oo..#
    #......######......#
    #....3.#....#.3....#
    #......#....#......#
    #..................#
    #...####....####...#
    #..................#
    #S.......99.......S#
    ####################
";

/// Serializable description of a room's navigation data
///
/// Layers are row-major with row 0 at the room's lower bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RoomDefinition {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(range(min = 1, max = 512))]
    pub width: u32,
    #[validate(range(min = 1, max = 512))]
    pub height: u32,
    /// World cell coordinate of the room's bottom-left cell
    pub lower_bounds: [i32; 2],
    #[validate(range(min = 0.05, max = 16.0))]
    pub cell_size: f32, // World units per cell edge
    pub movement_penalty: Vec<u8>,
    #[serde(default)]
    pub item_obstacles: Option<Vec<u8>>,
    pub spawn_positions: Vec<[f32; 2]>,
}

/// Read-only navigation data of a room set up for play
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub name: String,
    pub grid: CostGrid,
    pub spawn_points: SpawnPoints,
}

/// Set up the configured room file, or the demo room when none is set
pub fn load_room(room_file: Option<&str>) -> GunnerResult<RoomSnapshot> {
    let definition = match room_file {
        Some(file) => RoomDefinition::load_from_rooms_dir(file)?,
        None => RoomDefinition::demo()?,
    };
    definition.into_snapshot()
}

impl RoomSnapshot {
    /// Walkable loop through every spawn point in order
    ///
    /// Legs without a path are skipped.
    pub fn patrol_route(&self) -> Vec<Vec2> {
        let spawns = self.spawn_points.positions();
        let mut route = Vec::new();

        for (index, from) in spawns.iter().enumerate() {
            let to = spawns[(index + 1) % spawns.len()];
            let start = self.grid.world_to_cell(*from);
            let goal = self.grid.world_to_cell(to);

            match find_path(&self.grid, start, goal) {
                Some(path) => route.extend(path.into_waypoints()),
                None => warn!("No patrol leg from {start} to {goal} in '{}'", self.name),
            }
        }

        route
    }
}

impl RoomDefinition {
    /// Build a room from a text layout, top line first
    ///
    /// `.` open floor, `#` wall, `1`-`9` floor with that penalty, `o` an item
    /// on open floor, `S` open floor with a spawn point at the cell center.
    /// Leading and trailing whitespace on each line is ignored.
    pub fn from_ascii(
        name: &str,
        layout: &str,
        cell_size: f32,
        lower_bounds: IVec2,
    ) -> GunnerResult<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = rows.first() else {
            return Err(GunnerError::RoomValidationFailed {
                reason: format!("room '{name}' layout is empty"),
            });
        };
        let width = first.chars().count();
        let height = rows.len();

        let mut movement_penalty = vec![DEFAULT_MOVEMENT_PENALTY; width * height];
        let mut item_obstacles = vec![ITEM_LAYER_CLEAR; width * height];
        let mut has_items = false;
        let mut spawn_positions = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(GunnerError::RoomValidationFailed {
                    reason: format!(
                        "room '{name}' row {row_index} has {} cells, expected {width}",
                        row.chars().count()
                    ),
                });
            }

            // The first text line is the top of the room
            let y = height - 1 - row_index;
            for (x, symbol) in row.chars().enumerate() {
                let index = y * width + x;
                match symbol {
                    '.' => {}
                    '#' => movement_penalty[index] = BLOCKED_PENALTY,
                    'o' => {
                        item_obstacles[index] = BLOCKED_PENALTY;
                        has_items = true;
                    }
                    'S' => {
                        let world_cell = IVec2::new(x as i32, y as i32) + lower_bounds;
                        let center = (world_cell.as_vec2() + Vec2::splat(0.5)) * cell_size;
                        spawn_positions.push(center.to_array());
                    }
                    '1'..='9' => {
                        movement_penalty[index] = symbol as u8 - b'0';
                    }
                    other => {
                        return Err(GunnerError::RoomValidationFailed {
                            reason: format!(
                                "room '{name}' has unknown symbol '{other}' at ({x}, {y})"
                            ),
                        });
                    }
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            width: width as u32,
            height: height as u32,
            lower_bounds: lower_bounds.to_array(),
            cell_size,
            movement_penalty,
            item_obstacles: has_items.then_some(item_obstacles),
            spawn_positions,
        })
    }

    /// Room used by the demo when nothing else is configured
    pub fn demo() -> GunnerResult<Self> {
        Self::from_ascii("demo hall", DEMO_ROOM_LAYOUT, 1.0, IVec2::ZERO)
    }

    /// Validate and turn into the read-only form used during play
    ///
    /// Every configuration problem surfaces here, so queries against the
    /// snapshot never fail.
    pub fn into_snapshot(self) -> GunnerResult<RoomSnapshot> {
        self.validate_fields()?;

        let grid = CostGrid::new(
            self.width,
            self.height,
            IVec2::from_array(self.lower_bounds),
            self.cell_size,
            self.movement_penalty,
            self.item_obstacles,
        )?;

        let spawn_points = SpawnPoints::new(
            &self.name,
            self.spawn_positions
                .into_iter()
                .map(Vec2::from_array)
                .collect(),
        )?;

        let traversable = grid.traversable_count();
        info!(
            "Room '{}' ready: {}x{} cells, {traversable} traversable, {} spawn points",
            self.name,
            grid.width(),
            grid.height(),
            spawn_points.len()
        );

        Ok(RoomSnapshot {
            name: self.name,
            grid,
            spawn_points,
        })
    }

    fn validate_fields(&self) -> GunnerResult<()> {
        self.validate().map_err(|validation_errors| {
            let error_details = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    format!("{field}: {}", error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            GunnerError::RoomValidationFailed {
                reason: format!("room '{}': {error_details}", self.name),
            }
        })
    }

    /// Get the rooms directory path
    pub fn get_rooms_dir() -> GunnerResult<PathBuf> {
        Ok(std::env::current_dir()?.join("rooms"))
    }

    /// Load a room file from the rooms directory
    pub fn load_from_rooms_dir<P: AsRef<Path>>(filename: P) -> GunnerResult<Self> {
        Self::load_from_path(Self::get_rooms_dir()?.join(filename))
    }

    /// Load a room by extension: `.toml`, `.txt` ASCII layouts, anything else bincode
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> GunnerResult<Self> {
        let file_path = path.as_ref();
        if !file_path.exists() {
            return Err(GunnerError::RoomFileNotFound {
                path: file_path.to_path_buf(),
            });
        }

        let room = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&std::fs::read_to_string(file_path)?)?,
            Some("txt") => {
                let name = file_path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or("room");
                Self::from_ascii(name, &std::fs::read_to_string(file_path)?, 1.0, IVec2::ZERO)?
            }
            _ => {
                let data = std::fs::read(file_path)?;
                let (room, _): (RoomDefinition, usize) =
                    bincode::serde::decode_from_slice(&data, bincode::config::standard())
                        .map_err(|e| GunnerError::CorruptedRoomFile {
                            reason: format!("Failed to deserialize room data: {e}"),
                        })?;
                room
            }
        };

        room.validate_fields()?;
        Ok(room)
    }

    /// Save a room, as TOML for `.toml` paths and bincode otherwise
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> GunnerResult<()> {
        self.validate_fields()?;

        let file_path = path.as_ref();
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(self)?.into_bytes(),
            _ => bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
                GunnerError::CorruptedRoomFile {
                    reason: format!("Failed to serialize room: {e}"),
                }
            })?,
        };

        std::fs::write(file_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::{find_path, CellProbe, GridCell};

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gunner-room-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_ascii_layout_parsing() {
        let room = RoomDefinition::from_ascii(
            "tiny",
            "
            #o3
            S.#
            ",
            2.0,
            IVec2::new(-1, 0),
        )
        .unwrap();

        assert_eq!((room.width, room.height), (3, 2));
        // Bottom row first
        assert_eq!(room.movement_penalty, vec![1, 1, 0, 0, 1, 3]);
        assert_eq!(
            room.item_obstacles,
            Some(vec![255, 255, 255, 255, 0, 255])
        );
        // Cell (0, 0) sits at world cell (-1, 0)
        assert_eq!(room.spawn_positions, vec![[-1.0, 1.0]]);

        let snapshot = room.into_snapshot().unwrap();
        assert_eq!(snapshot.grid.probe(GridCell::new(1, 1)), CellProbe::Blocked);
        assert_eq!(
            snapshot.grid.probe(GridCell::new(2, 1)),
            CellProbe::Traversable { cost: 3 }
        );
    }

    #[test]
    fn test_ascii_layout_errors() {
        assert!(RoomDefinition::from_ascii("empty", "  \n ", 1.0, IVec2::ZERO).is_err());
        assert!(RoomDefinition::from_ascii("ragged", "...\n..", 1.0, IVec2::ZERO).is_err());
        assert!(RoomDefinition::from_ascii("odd", "..?", 1.0, IVec2::ZERO).is_err());
    }

    #[test]
    fn test_room_without_spawns_is_rejected_at_setup() {
        let room = RoomDefinition::from_ascii("closet", "...\n...", 1.0, IVec2::ZERO).unwrap();
        let err = room.into_snapshot().unwrap_err();
        assert!(matches!(err, GunnerError::EmptySpawnPositions { .. }));
    }

    #[test]
    fn test_layer_mismatch_is_rejected_at_setup() {
        let mut room = RoomDefinition::demo().unwrap();
        room.movement_penalty.pop();
        assert!(matches!(
            room.into_snapshot().unwrap_err(),
            GunnerError::GridDimensionMismatch { .. }
        ));
    }

    #[test]
    fn test_field_validation() {
        let mut room = RoomDefinition::demo().unwrap();
        room.cell_size = 100.0;

        let err = room.into_snapshot().unwrap_err();
        assert!(matches!(&err, GunnerError::RoomValidationFailed { reason } if reason.contains("cell_size")));
    }

    #[test]
    fn test_demo_room_is_connected_between_spawns() {
        let snapshot = RoomDefinition::demo().unwrap().into_snapshot().unwrap();
        let spawns = snapshot.spawn_points.positions();
        assert_eq!(spawns.len(), 4);

        let start = snapshot.grid.world_to_cell(spawns[0]);
        for spawn in &spawns[1..] {
            let goal = snapshot.grid.world_to_cell(*spawn);
            assert!(find_path(&snapshot.grid, start, goal).is_some());
        }
    }

    #[test]
    fn test_patrol_route_visits_every_spawn() {
        let snapshot = RoomDefinition::demo().unwrap().into_snapshot().unwrap();
        let route = snapshot.patrol_route();

        for spawn in snapshot.spawn_points.positions() {
            assert!(route.contains(spawn), "route misses {spawn}");
        }
        for cell in route.iter().map(|p| snapshot.grid.world_to_cell(*p)) {
            assert!(snapshot.grid.is_traversable(cell));
        }
    }

    #[test]
    fn test_bincode_and_toml_files_round_trip() {
        let room = RoomDefinition::demo().unwrap();

        for extension in ["bin", "toml"] {
            let path = scratch_path(&format!("demo.{extension}"));
            room.save_to_path(&path).unwrap();
            let loaded = RoomDefinition::load_from_path(&path).unwrap();
            let _ = std::fs::remove_file(&path);
            assert_eq!(loaded, room, "{extension} round trip");
        }
    }

    #[test]
    fn test_missing_and_corrupted_files() {
        let missing = scratch_path("missing.bin");
        assert!(matches!(
            RoomDefinition::load_from_path(&missing).unwrap_err(),
            GunnerError::RoomFileNotFound { .. }
        ));

        let corrupted = scratch_path("corrupted.bin");
        std::fs::write(&corrupted, [0xff, 0x01]).unwrap();
        let result = RoomDefinition::load_from_path(&corrupted);
        let _ = std::fs::remove_file(&corrupted);
        assert!(matches!(
            result.unwrap_err(),
            GunnerError::CorruptedRoomFile { .. }
        ));
    }
}
