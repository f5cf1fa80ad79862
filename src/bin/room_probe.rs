use clap::Parser;
use gunner::game_logic::errors::GunnerResult;
use gunner::pathfinding::{find_path, resolve_reachable_target, ResolvedTarget};
use gunner::room::RoomDefinition;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::path::PathBuf;

mod room_probe {
    pub mod cli_utils;
}

use room_probe::cli_utils::*;

#[derive(Parser, Clone)]
#[command(name = "room_probe")]
#[command(about = "Plan a chase path through a room and print the route")]
struct Args {
    /// Room file (.toml, .txt layout, anything else bincode); the demo room when omitted
    room: Option<PathBuf>,

    /// Chaser position in world units (format: X,Y)
    #[arg(long, allow_hyphen_values = true)]
    from: String,

    /// Target position in world units (format: X,Y)
    #[arg(long, allow_hyphen_values = true)]
    to: String,

    /// Seed for the neighbour and spawn fallback choices
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Print the room with the route drawn on it
    #[arg(long)]
    draw: bool,

    /// Also save the loaded room (.toml or bincode)
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> GunnerResult<()> {
    let args = Args::parse();

    let from = parse_position(&args.from)?;
    let to = parse_position(&args.to)?;

    let definition = match &args.room {
        Some(path) => RoomDefinition::load_from_path(path)?,
        None => RoomDefinition::demo()?,
    };

    if let Some(export) = &args.export {
        definition.save_to_path(export)?;
        println!("Room saved to: {}", export.display());
    }

    let room = definition.into_snapshot()?;
    let grid = &room.grid;
    let mut rng = Pcg64::seed_from_u64(args.seed);

    let start = grid.world_to_cell(from);
    let resolved = resolve_reachable_target(to, grid, &room.spawn_points, &mut rng);
    let goal = resolved.cell();

    println!("Room: {} ({}x{} cells)", room.name, grid.width(), grid.height());
    println!("Start cell: {start}");
    match resolved {
        ResolvedTarget::Direct(cell) => println!("Goal cell: {cell}"),
        ResolvedTarget::Neighbor(cell) => println!("Goal cell: {cell} (open neighbour of target)"),
        ResolvedTarget::SpawnFallback(cell) => println!("Goal cell: {cell} (spawn fallback)"),
    }

    let Some(path) = find_path(grid, start, goal) else {
        println!("No path");
        if args.draw {
            print!("{}", render_room(grid, &[], start, goal));
        }
        return Ok(());
    };

    println!("Cost: {:.3}", path.cost());
    println!("Waypoints ({}):", path.len());
    for (cell, waypoint) in path.cells().iter().zip(path.waypoints()) {
        println!("  {cell} -> ({:.2}, {:.2})", waypoint.x, waypoint.y);
    }

    if args.draw {
        print!("{}", render_room(grid, path.cells(), start, goal));
    }

    Ok(())
}
