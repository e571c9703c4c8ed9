//! In-memory tile store shared by every agent during a generation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Coordinate, HintId, TileGeometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HintKind {
    Light { warmth: u8 },
    SpawnPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hint {
    pub kind: HintKind,
    pub key: u64,
}

impl Hint {
    pub fn light(key: u64, warmth: u8) -> Self {
        Self { kind: HintKind::Light { warmth }, key }
    }

    pub fn spawn_point(key: u64) -> Self {
        Self { kind: HintKind::SpawnPoint, key }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub coordinate: Coordinate,
    pub geometry: TileGeometry,
}

const AXIS_BITS: u32 = 21;
const AXIS_BIAS: i64 = 1 << (AXIS_BITS - 1);
const AXIS_MASK: u64 = (1 << AXIS_BITS) - 1;

#[derive(Clone, Debug, Default)]
pub struct TileMap {
    tiles: BTreeMap<Coordinate, Tile>,
    hints: SlotMap<HintId, Hint>,
    hint_keys: BTreeMap<u64, Vec<HintId>>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent create-or-lookup: geometry is fixed by whoever touches the cell first.
    pub fn touch_tile(&mut self, coordinate: Coordinate, geometry: TileGeometry) -> Tile {
        *self.tiles.entry(coordinate).or_insert(Tile { coordinate, geometry })
    }

    pub fn tile(&self, coordinate: Coordinate) -> Option<Tile> {
        self.tiles.get(&coordinate).copied()
    }

    pub fn tile_exists(&self, coordinate: Coordinate) -> bool {
        self.tiles.contains_key(&coordinate)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn register_hint(&mut self, hint: Hint) -> HintId {
        let key = hint.key;
        let id = self.hints.insert(hint);
        self.hint_keys.entry(key).or_default().push(id);
        id
    }

    pub fn hint(&self, id: HintId) -> Option<Hint> {
        self.hints.get(id).copied()
    }

    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    pub fn hints_at(&self, key: u64) -> impl Iterator<Item = Hint> + '_ {
        self.hint_keys
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|id| self.hints.get(*id).copied())
    }

    /// Hints in ascending key order, the order `canonical_bytes` serializes them in.
    pub fn hints(&self) -> impl Iterator<Item = Hint> + '_ {
        self.hint_keys.values().flatten().filter_map(|id| self.hints.get(*id).copied())
    }

    /// Packs each axis into 21 biased bits. Coordinates stay far below the
    /// bias in practice; the mask keeps pathological inputs from colliding
    /// across axis boundaries.
    pub fn key_from_index_coordinates(x: i32, y: i32, z: i32) -> u64 {
        let px = ((x as i64 + AXIS_BIAS) as u64) & AXIS_MASK;
        let py = ((y as i64 + AXIS_BIAS) as u64) & AXIS_MASK;
        let pz = ((z as i64 + AXIS_BIAS) as u64) & AXIS_MASK;
        (px << (2 * AXIS_BITS)) | (py << AXIS_BITS) | pz
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.tiles.len() as u32).to_le_bytes());
        for tile in self.tiles.values() {
            bytes.extend(tile.coordinate.x.to_le_bytes());
            bytes.extend(tile.coordinate.y.to_le_bytes());
            bytes.extend(tile.coordinate.z.to_le_bytes());
            bytes.push(match tile.geometry {
                TileGeometry::Empty => 0,
                TileGeometry::Full => 1,
                TileGeometry::Floor => 2,
            });
        }
        bytes.extend((self.hints.len() as u32).to_le_bytes());
        for hint in self.hints() {
            bytes.extend(hint.key.to_le_bytes());
            match hint.kind {
                HintKind::Light { warmth } => {
                    bytes.push(0);
                    bytes.push(warmth);
                }
                HintKind::SpawnPoint => bytes.push(1),
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
