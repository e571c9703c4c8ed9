pub mod map;
pub mod mapgen;
pub mod types;

pub use map::{Hint, HintKind, Tile, TileMap};
pub use mapgen::{
    GenEvent, GeneratedMap, GenerationBudget, LevelProfile, MapGenerator, MapSummary, generate_map,
};
pub use types::*;
