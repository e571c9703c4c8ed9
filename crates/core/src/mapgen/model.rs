//! Output model and generation event records.

use serde::{Deserialize, Serialize};

use crate::map::{HintKind, TileMap};
use crate::types::{Coordinate, TileGeometry};

/// Inspectable record of what the orchestrator did, in order. Tools and
/// tests read these instead of scraping stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenEvent {
    CohortFinished { generations: u32, routed_nodes: usize },
    NecessaryProcessed { consumed: usize, dropped: usize },
    OptionalProcessed { accepted: usize, declined: usize, dropped: usize },
    NodesInjected { count: usize },
    IterationCapReached,
    MapClosed { sealed: usize },
}

#[derive(Clone, Debug)]
pub struct GeneratedMap {
    pub map: TileMap,
    pub iterations: u32,
    pub events: Vec<GenEvent>,
}

impl GeneratedMap {
    pub fn fingerprint(&self) -> u64 {
        self.map.fingerprint()
    }

    pub fn summary(&self) -> MapSummary {
        MapSummary {
            tile_count: self.map.tile_count(),
            hint_count: self.map.hint_count(),
            iterations: self.iterations,
            fingerprint: self.map.fingerprint(),
            tiles: self
                .map
                .tiles()
                .map(|tile| TileRecord { coordinate: tile.coordinate, geometry: tile.geometry })
                .collect(),
            hints: self
                .map
                .hints()
                .map(|hint| HintRecord { key: hint.key, kind: hint.kind })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub coordinate: Coordinate,
    pub geometry: TileGeometry,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintRecord {
    pub key: u64,
    pub kind: HintKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub tile_count: usize,
    pub hint_count: usize,
    pub iterations: u32,
    pub fingerprint: u64,
    pub tiles: Vec<TileRecord>,
    pub hints: Vec<HintRecord>,
}
