use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use snailgen_core::types::TileGeometry;
use snailgen_core::{GeneratedMap, LevelProfile, MapGenerator, MapSummary};
use std::fs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run seed for the generator
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Level profile: burrows, halls, or tangles
    #[arg(short, long, default_value = "burrows")]
    profile: String,
    /// Optional path to write a JSON report of the generated map
    #[arg(long)]
    json: Option<String>,
    /// Print the full generation event log
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct PreviewReport {
    seed: u64,
    profile: String,
    summary: MapSummary,
}

fn parse_profile(name: &str) -> Result<LevelProfile> {
    match name.to_ascii_lowercase().as_str() {
        "burrows" => Ok(LevelProfile::Burrows),
        "halls" => Ok(LevelProfile::Halls),
        "tangles" => Ok(LevelProfile::Tangles),
        other => bail!("unknown profile '{other}' (expected burrows, halls, or tangles)"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let profile = parse_profile(&args.profile)?;

    let generated = MapGenerator::new(args.seed, profile).generate();

    println!("Generated map for seed {} ({:?})", args.seed, profile);
    println!("Tiles: {}", generated.map.tile_count());
    println!("Hints: {}", generated.map.hint_count());
    println!("Iterations: {}", generated.iterations);
    println!("Fingerprint: {:016x}", generated.fingerprint());
    if args.verbose {
        for event in &generated.events {
            println!("  {event:?}");
        }
    }

    print_floor_slice(&generated);

    if let Some(path) = args.json {
        let report = PreviewReport {
            seed: args.seed,
            profile: args.profile.clone(),
            summary: generated.summary(),
        };
        let payload =
            serde_json::to_string_pretty(&report).context("Failed to serialize map report")?;
        fs::write(&path, payload).with_context(|| format!("Failed to write report to {path}"))?;
        println!("Wrote report to {path}");
    }

    Ok(())
}

/// Renders the floor-level (y == 0) slice: '.' floor, ',' open air,
/// '#' sealed solid, space for cells the generator never touched.
fn print_floor_slice(generated: &GeneratedMap) {
    let floor_tiles: Vec<_> =
        generated.map.tiles().filter(|tile| tile.coordinate.y == 0).collect();
    let Some(first) = floor_tiles.first() else {
        println!("(empty floor slice)");
        return;
    };

    let mut min_x = first.coordinate.x;
    let mut max_x = first.coordinate.x;
    let mut min_z = first.coordinate.z;
    let mut max_z = first.coordinate.z;
    for tile in &floor_tiles {
        min_x = min_x.min(tile.coordinate.x);
        max_x = max_x.max(tile.coordinate.x);
        min_z = min_z.min(tile.coordinate.z);
        max_z = max_z.max(tile.coordinate.z);
    }

    for z in (min_z..=max_z).rev() {
        let mut row = String::new();
        for x in min_x..=max_x {
            let glyph = match floor_tiles
                .iter()
                .find(|tile| tile.coordinate.x == x && tile.coordinate.z == z)
            {
                Some(tile) => match tile.geometry {
                    TileGeometry::Floor => '.',
                    TileGeometry::Empty => ',',
                    TileGeometry::Full => '#',
                },
                None => ' ',
            };
            row.push(glyph);
        }
        println!("{row}");
    }
}
