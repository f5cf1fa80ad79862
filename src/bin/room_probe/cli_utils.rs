use bevy::prelude::*;
use gunner::game_logic::errors::{GunnerError, GunnerResult};
use gunner::pathfinding::{CostGrid, GridCell};

/// Generic parser for delimited strings that return tuples
pub fn parse_delimited<T, const N: usize>(
    input: &str,
    delimiter: char,
    type_name: &str,
    parser: impl Fn(&str) -> Result<T, std::num::ParseFloatError>,
) -> GunnerResult<[T; N]>
where
    T: Copy + Default,
{
    let parts: Vec<&str> = input.split(delimiter).collect();
    if parts.len() != N {
        return Err(GunnerError::InvalidArgument {
            reason: format!(
                "Invalid {type_name} format '{input}'. Expected {N} {delimiter}-separated values"
            ),
        });
    }

    let mut result = [T::default(); N];
    for (i, part) in parts.iter().enumerate() {
        result[i] = parser(part.trim()).map_err(|_| GunnerError::InvalidArgument {
            reason: format!("Invalid {type_name} value: '{part}'"),
        })?;
    }

    Ok(result)
}

/// Parse position string "X,Y"
pub fn parse_position(pos_str: &str) -> GunnerResult<Vec2> {
    let [x, y] = parse_delimited::<f32, 2>(pos_str, ',', "position", |s| s.parse())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(GunnerError::InvalidArgument {
            reason: format!("Position '{pos_str}' must be finite"),
        });
    }
    Ok(Vec2::new(x, y))
}

/// Draw the room top row first with the route on top
///
/// `#` blocked, `.` open, `2`-`9` penalties (`+` above 9), `*` route,
/// `A` start, `B` goal.
pub fn render_room(grid: &CostGrid, route: &[GridCell], start: GridCell, goal: GridCell) -> String {
    let mut out = String::new();

    for y in (0..grid.height() as i32).rev() {
        for x in 0..grid.width() as i32 {
            let cell = GridCell::new(x, y);
            let symbol = if cell == start {
                'A'
            } else if cell == goal {
                'B'
            } else if route.contains(&cell) {
                '*'
            } else {
                match grid.cost_of(cell) {
                    None | Some(0) => '#',
                    Some(1) => '.',
                    Some(cost @ 2..=9) => char::from(b'0' + cost),
                    Some(_) => '+',
                }
            };
            out.push(symbol);
        }
        out.push('\n');
    }

    out
}
