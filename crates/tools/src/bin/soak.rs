use anyhow::Result;
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use snailgen_core::map::HintKind;
use snailgen_core::types::{Direction, TileGeometry};
use snailgen_core::{GenerationBudget, LevelProfile, MapGenerator, TileMap};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First run seed of the sweep
    #[arg(long, default_value_t = 0)]
    start_seed: u64,
    /// Number of generation runs
    #[arg(short, long, default_value_t = 64)]
    runs: u64,
    /// Seed for the harness-side profile shuffle
    #[arg(long, default_value_t = 1)]
    harness_seed: u64,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let budget = GenerationBudget::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.harness_seed);

    println!(
        "Soaking {} runs starting at seed {} (cap {} iterations each)...",
        args.runs, args.start_seed, budget.outer_iteration_cap
    );

    let mut total_tiles = 0_usize;
    let mut total_hints = 0_usize;
    let mut capped_runs = 0_usize;
    for seed in args.start_seed..args.start_seed + args.runs {
        let profile = choose(&mut rng, &[
            LevelProfile::Burrows,
            LevelProfile::Halls,
            LevelProfile::Tangles,
        ]);
        let generated = MapGenerator::with_budget(seed, profile, budget).generate();

        // Invariants the engine promises for every seed.
        assert!(
            generated.iterations <= budget.outer_iteration_cap,
            "seed {seed}: iteration cap exceeded"
        );
        for tile in generated.map.tiles() {
            if tile.geometry == TileGeometry::Full {
                continue;
            }
            for direction in Direction::ALL {
                assert!(
                    generated.map.tile_exists(direction.advance(tile.coordinate)),
                    "seed {seed}: open boundary at {:?} toward {direction:?}",
                    tile.coordinate
                );
            }
        }
        let origin_key = TileMap::key_from_index_coordinates(0, 0, 0);
        assert!(
            generated.map.hints_at(origin_key).any(|hint| hint.kind == HintKind::SpawnPoint),
            "seed {seed}: no spawn point at the origin"
        );

        if generated.iterations == budget.outer_iteration_cap {
            capped_runs += 1;
        }
        total_tiles += generated.map.tile_count();
        total_hints += generated.map.hint_count();
    }

    println!("Soak completed successfully.");
    println!("Average tiles: {}", total_tiles / args.runs.max(1) as usize);
    println!("Average hints: {}", total_hints / args.runs.max(1) as usize);
    println!("Runs that hit the iteration cap: {capped_runs}");

    Ok(())
}
