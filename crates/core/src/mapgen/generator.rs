//! Frontier-queue orchestration: drains expansion nodes into agent cohorts
//! until the map reaches its size bounds or an iteration cap trips.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::map::{Hint, TileMap};
use crate::types::{Coordinate, Direction, TileGeometry};

use super::catalog::SnailCatalog;
use super::model::{GenEvent, GeneratedMap};
use super::node::{ExpansionNode, NodePriority};
use super::snail::{Snail, fork_rng};
use super::tuning::{
    GenerationBudget, INJECTED_NODE_LIMIT, INJECTION_RUNWAY_EAST_WEST,
    INJECTION_RUNWAY_NORTH_SOUTH, LevelProfile, OPTIONAL_BACKLOG_THRESHOLD,
};

const SEED_ROOM_WIDTH: i32 = 7;
const SEED_ROOM_HEIGHT: i32 = 4;
const SEED_ROOM_DEPTH: i32 = 7;

pub struct MapGenerator {
    rng: ChaCha8Rng,
    catalog: SnailCatalog,
    budget: GenerationBudget,
    necessary_nodes: Vec<ExpansionNode>,
    optional_nodes: Vec<ExpansionNode>,
    events: Vec<GenEvent>,
}

impl MapGenerator {
    pub fn new(run_seed: u64, profile: LevelProfile) -> Self {
        Self::with_budget(run_seed, profile, GenerationBudget::default())
    }

    pub fn with_budget(run_seed: u64, profile: LevelProfile, budget: GenerationBudget) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(run_seed),
            catalog: SnailCatalog::for_profile(profile),
            budget,
            necessary_nodes: Vec::new(),
            optional_nodes: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn generate(mut self) -> GeneratedMap {
        let mut map = TileMap::new();

        let seed_rng = fork_rng(&mut self.rng);
        let seed_room = Snail::room(
            Coordinate::ORIGIN,
            Direction::North,
            seed_rng,
            SEED_ROOM_WIDTH,
            SEED_ROOM_HEIGHT,
            SEED_ROOM_DEPTH,
        );
        self.run_cohort(&mut map, seed_room);

        let origin_key = TileMap::key_from_index_coordinates(0, 0, 0);
        map.register_hint(Hint::spawn_point(origin_key));
        let warmth = (self.rng.next_u64() % 256) as u8;
        map.register_hint(Hint::light(origin_key, warmth));

        let mut iterations = 0;
        while (!self.necessary_nodes.is_empty() || self.should_add_more_optional(&map))
            && iterations < self.budget.outer_iteration_cap
        {
            self.process_necessary(&mut map);
            self.process_optional(&mut map);
            if map.tile_count() < self.budget.min_tile_count
                && self.necessary_nodes.is_empty()
                && self.optional_nodes.len() < OPTIONAL_BACKLOG_THRESHOLD
            {
                self.inject_expansion_nodes(&mut map);
            }
            iterations += 1;
        }
        if iterations == self.budget.outer_iteration_cap {
            self.events.push(GenEvent::IterationCapReached);
        }

        self.close_map(&mut map);

        GeneratedMap { map, iterations, events: self.events }
    }

    /// More optional work is worthwhile while any is queued and the map has
    /// room to grow; a map at its maximum stops accepting frontiers.
    fn should_add_more_optional(&self, map: &TileMap) -> bool {
        !self.optional_nodes.is_empty() && map.tile_count() < self.budget.max_tile_count
    }

    fn process_necessary(&mut self, map: &mut TileMap) {
        let batch = std::mem::take(&mut self.necessary_nodes);
        if batch.is_empty() {
            return;
        }
        let mut consumed = 0;
        let mut dropped = 0;
        for mut node in batch {
            if node.is_consumed() {
                continue;
            }
            node.consume();
            match self.catalog.build(&node, fork_rng(&mut self.rng)) {
                Some(snail) => {
                    consumed += 1;
                    self.run_cohort(map, snail);
                }
                None => dropped += 1,
            }
        }
        self.events.push(GenEvent::NecessaryProcessed { consumed, dropped });
    }

    fn process_optional(&mut self, map: &mut TileMap) {
        let batch = std::mem::take(&mut self.optional_nodes);
        if batch.is_empty() {
            return;
        }
        let mut accepted = 0;
        let mut declined = 0;
        let mut dropped = 0;
        for mut node in batch {
            if node.is_consumed() {
                continue;
            }
            if self.rng.next_u64() % 100 >= self.budget.optional_acceptance_percent {
                declined += 1;
                continue;
            }
            node.consume();
            match self.catalog.build(&node, fork_rng(&mut self.rng)) {
                Some(snail) => {
                    accepted += 1;
                    self.run_cohort(map, snail);
                }
                None => dropped += 1,
            }
        }
        self.events.push(GenEvent::OptionalProcessed { accepted, declined, dropped });
    }

    /// Lockstep generations: every active snail steps once per generation,
    /// and the next generation is survivors followed by everything spawned
    /// this round. The step cap is a safety valve against runaway
    /// branching, not an error.
    fn run_cohort(&mut self, map: &mut TileMap, seed: Snail) {
        let mut active = vec![seed];
        let mut generations = 0;
        let mut routed_nodes = 0;
        while !active.is_empty() && generations < self.budget.cohort_step_cap {
            let mut survivors = Vec::new();
            let mut spawned_this_generation = Vec::new();
            for mut snail in active {
                let result = snail.step(map);
                routed_nodes += result.nodes.len();
                for node in result.nodes {
                    match node.priority {
                        NodePriority::Necessary => self.necessary_nodes.push(node),
                        NodePriority::Optional => self.optional_nodes.push(node),
                    }
                }
                spawned_this_generation.extend(result.spawned);
                if !result.complete {
                    survivors.push(snail);
                }
            }
            survivors.extend(spawned_this_generation);
            active = survivors;
            generations += 1;
        }
        self.events.push(GenEvent::CohortFinished { generations, routed_nodes });
    }

    /// Stall fallback: when the frontier dries up while the map is still
    /// undersized, scan existing tiles for open neighbors with enough
    /// runway and queue a handful of synthetic optional nodes there.
    fn inject_expansion_nodes(&mut self, map: &mut TileMap) {
        let mut candidates = Vec::new();
        for tile in map.tiles() {
            if tile.geometry == TileGeometry::Full {
                continue;
            }
            for direction in Direction::HORIZONTAL {
                let start = direction.advance(tile.coordinate);
                if map.tile_exists(start) {
                    continue;
                }
                let runway = match direction {
                    Direction::East | Direction::West => INJECTION_RUNWAY_EAST_WEST,
                    _ => INJECTION_RUNWAY_NORTH_SOUTH,
                };
                let mut cursor = start;
                let mut clear = true;
                for _ in 0..runway {
                    if map.tile_exists(cursor) {
                        clear = false;
                        break;
                    }
                    cursor = direction.advance(cursor);
                }
                if clear {
                    candidates.push((start, direction));
                }
            }
        }

        let mut injected = 0;
        while injected < INJECTED_NODE_LIMIT && !candidates.is_empty() {
            let pick = (self.rng.next_u64() % candidates.len() as u64) as usize;
            let (position, direction) = candidates.swap_remove(pick);
            self.optional_nodes.push(ExpansionNode::new(
                position,
                direction,
                NodePriority::Optional,
                "injected",
            ));
            injected += 1;
        }
        self.events.push(GenEvent::NodesInjected { count: injected });
    }

    /// Seals the boundary: every tile left open to the void gets its absent
    /// neighbors created as solid.
    fn close_map(&mut self, map: &mut TileMap) {
        let open_coordinates: Vec<Coordinate> = map
            .tiles()
            .filter(|tile| tile.geometry != TileGeometry::Full)
            .map(|tile| tile.coordinate)
            .collect();
        let mut sealed = 0;
        for coordinate in open_coordinates {
            for direction in Direction::ALL {
                let neighbor = direction.advance(coordinate);
                if !map.tile_exists(neighbor) {
                    map.touch_tile(neighbor, TileGeometry::Full);
                    sealed += 1;
                }
            }
        }
        self.events.push(GenEvent::MapClosed { sealed });
    }
}
