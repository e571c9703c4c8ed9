//! Agent-based expansion-node map generation split into coherent submodules.

pub mod model;
pub mod tuning;

mod catalog;
mod generator;
mod node;
mod snail;

pub use generator::MapGenerator;
pub use model::{GenEvent, GeneratedMap, HintRecord, MapSummary, TileRecord};
pub use node::{ExpansionNode, NodePriority};
pub use snail::{Snail, StepResult};
pub use tuning::{GenerationBudget, LevelProfile};

pub fn generate_map(run_seed: u64, profile: LevelProfile) -> GeneratedMap {
    MapGenerator::new(run_seed, profile).generate()
}
