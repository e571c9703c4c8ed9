//! Generation budgets, level profiles, and the tuning constants behind them.

/// Selects which snail catalog weights drive generation for a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LevelProfile {
    Burrows,
    Halls,
    Tangles,
}

pub const MIN_TILE_COUNT: usize = 200;
pub const MAX_TILE_COUNT: usize = 1000;
pub const OUTER_ITERATION_CAP: u32 = 64;
pub const COHORT_STEP_CAP: u32 = 100;
pub const OPTIONAL_ACCEPTANCE_PERCENT: u64 = 60;

pub(super) const LIGHT_HINT_PERCENT: u64 = 7;
pub(super) const ROOM_SPAWN_HINT_PERCENT: u64 = 15;

// A room in a crowded map gives up rather than re-carve mostly existing cells.
pub(super) const ROOM_OVERLAP_LENIENCY_TILES: usize = 120;
pub(super) const ROOM_OVERLAP_ABORT_PERCENT: usize = 35;

pub(super) const INJECTED_NODE_LIMIT: usize = 5;
pub(super) const OPTIONAL_BACKLOG_THRESHOLD: usize = 3;
pub(super) const INJECTION_RUNWAY_EAST_WEST: u32 = 3;
pub(super) const INJECTION_RUNWAY_NORTH_SOUTH: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationBudget {
    pub min_tile_count: usize,
    pub max_tile_count: usize,
    pub optional_acceptance_percent: u64,
    pub outer_iteration_cap: u32,
    pub cohort_step_cap: u32,
}

impl Default for GenerationBudget {
    fn default() -> Self {
        Self {
            min_tile_count: MIN_TILE_COUNT,
            max_tile_count: MAX_TILE_COUNT,
            optional_acceptance_percent: OPTIONAL_ACCEPTANCE_PERCENT,
            outer_iteration_cap: OUTER_ITERATION_CAP,
            cohort_step_cap: COHORT_STEP_CAP,
        }
    }
}
