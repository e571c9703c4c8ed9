//! The stepped generation agents ("snails") that carve tiles into the shared map.
//!
//! A snail is one small state machine: it owns a position, a facing
//! direction, and a seeded rng, and mutates the map only inside its own
//! `step`. Composite behaviors (Branch, Parallel, Spawn) hold whole child
//! snails by value and hand owned copies back through `StepResult`, so the
//! orchestrator is the only scheduler.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::map::{Hint, TileMap};
use crate::types::{Coordinate, Direction, TileGeometry};

use super::node::{ExpansionNode, NodePriority};
use super::tuning::{
    LIGHT_HINT_PERCENT, ROOM_OVERLAP_ABORT_PERCENT, ROOM_OVERLAP_LENIENCY_TILES,
    ROOM_SPAWN_HINT_PERCENT,
};

/// Derives an independently seeded child rng without sharing stream state.
pub(super) fn fork_rng(rng: &mut ChaCha8Rng) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(rng.next_u64())
}

#[derive(Clone, Debug)]
enum Behavior {
    Forward { remaining: u32 },
    Room { width: i32, height: i32, depth: i32, spawn_percent: u64 },
    Turn { quarter_turns: i32 },
    Branch { prototypes: Vec<Snail> },
    Parallel { primary: Box<Snail>, extras: Vec<Snail> },
    Spawn { percent: u64, candidate: Box<Snail> },
}

#[derive(Debug)]
pub struct StepResult {
    pub complete: bool,
    pub spawned: Vec<Snail>,
    pub nodes: Vec<ExpansionNode>,
}

impl StepResult {
    fn completed() -> Self {
        Self { complete: true, spawned: Vec::new(), nodes: Vec::new() }
    }

    fn in_progress() -> Self {
        Self { complete: false, spawned: Vec::new(), nodes: Vec::new() }
    }
}

#[derive(Clone, Debug)]
pub struct Snail {
    position: Coordinate,
    direction: Direction,
    rng: ChaCha8Rng,
    complete: bool,
    behavior: Behavior,
}

impl Snail {
    fn new(
        position: Coordinate,
        direction: Direction,
        rng: ChaCha8Rng,
        behavior: Behavior,
    ) -> Self {
        Self { position, direction, rng, complete: false, behavior }
    }

    /// Carves a corridor run of `distance` cells; corridors are dumb and
    /// emit no frontier nodes, branching is whatever follows via `then`.
    pub fn forward(
        position: Coordinate,
        direction: Direction,
        rng: ChaCha8Rng,
        distance: u32,
    ) -> Self {
        Self::new(position, direction, rng, Behavior::Forward { remaining: distance })
    }

    /// Carves a floor-anchored volume centered on the snail and emits one
    /// optional frontier node outside each horizontal wall face.
    pub fn room(
        position: Coordinate,
        direction: Direction,
        rng: ChaCha8Rng,
        width: i32,
        height: i32,
        depth: i32,
    ) -> Self {
        Self::new(
            position,
            direction,
            rng,
            Behavior::Room { width, height, depth, spawn_percent: ROOM_SPAWN_HINT_PERCENT },
        )
    }

    pub fn turn(
        position: Coordinate,
        direction: Direction,
        rng: ChaCha8Rng,
        quarter_turns: i32,
    ) -> Self {
        Self::new(position, direction, rng, Behavior::Turn { quarter_turns })
    }

    /// Forks one lineage into copies of every prototype, all repositioned
    /// to the branch point.
    pub fn branch(
        position: Coordinate,
        direction: Direction,
        rng: ChaCha8Rng,
        prototypes: Vec<Snail>,
    ) -> Self {
        Self::new(position, direction, rng, Behavior::Branch { prototypes })
    }

    /// Runs `primary` to completion, then releases `extras` at its final
    /// position and direction. Extras are never stepped early.
    pub fn parallel(mut primary: Snail, extras: Vec<Snail>) -> Self {
        let position = primary.position;
        let direction = primary.direction;
        // The wrapper rolls its own base-step hints; a forked stream keeps
        // those rolls uncorrelated with the primary's.
        let rng = fork_rng(&mut primary.rng);
        Self::new(position, direction, rng, Behavior::Parallel {
            primary: Box::new(primary),
            extras,
        })
    }

    /// Draws once; below `percent` it releases a positioned copy of the
    /// candidate, otherwise nothing. Never re-rolled.
    pub fn maybe(
        position: Coordinate,
        direction: Direction,
        rng: ChaCha8Rng,
        percent: u64,
        candidate: Snail,
    ) -> Self {
        Self::new(position, direction, rng, Behavior::Spawn {
            percent,
            candidate: Box::new(candidate),
        })
    }

    pub fn then(self, next: Snail) -> Snail {
        Snail::parallel(self, vec![next])
    }

    pub fn then_all(self, followers: Vec<Snail>) -> Snail {
        Snail::parallel(self, followers)
    }

    /// The copy contract: identical behavior tree and rng state, with an
    /// independently owned position so parent and copy never alias.
    pub fn copy_at(&self, position: Coordinate, direction: Direction) -> Snail {
        let mut copy = self.clone();
        copy.position = position;
        copy.direction = direction;
        copy
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// One lockstep tick. Completed snails are inert: stepping again is a
    /// no-op that re-carves nothing.
    pub fn step(&mut self, map: &mut TileMap) -> StepResult {
        if self.complete {
            return StepResult::completed();
        }

        if self.rng.next_u64() % 100 < LIGHT_HINT_PERCENT {
            let warmth = (self.rng.next_u64() % 256) as u8;
            let key = TileMap::key_from_index_coordinates(
                self.position.x,
                self.position.y,
                self.position.z,
            );
            map.register_hint(Hint::light(key, warmth));
        }
        map.touch_tile(self.position, TileGeometry::Floor);

        let result = self.advance_behavior(map);
        self.complete = result.complete;
        result
    }

    fn advance_behavior(&mut self, map: &mut TileMap) -> StepResult {
        match &mut self.behavior {
            Behavior::Forward { remaining } => {
                if *remaining == 0 {
                    return StepResult::completed();
                }
                // The floor cell under the snail is already ensured; open
                // the two cells of headroom above it.
                map.touch_tile(self.position.offset(0, 1, 0), TileGeometry::Empty);
                map.touch_tile(self.position.offset(0, 2, 0), TileGeometry::Empty);
                self.position = self.direction.advance(self.position);
                *remaining -= 1;
                if *remaining == 0 { StepResult::completed() } else { StepResult::in_progress() }
            }
            Behavior::Room { width, height, depth, spawn_percent } => {
                let width = *width;
                let height = *height;
                let depth = *depth;
                let spawn_percent = *spawn_percent;
                let center = self.position;
                let origin = center.offset(-(width / 2), 0, -(depth / 2));
                let volume = (width.max(0) * height.max(0) * depth.max(0)) as usize;

                if volume > 0 && map.tile_count() > ROOM_OVERLAP_LENIENCY_TILES {
                    let mut existing = 0_usize;
                    for dx in 0..width {
                        for dy in 0..height {
                            for dz in 0..depth {
                                if map.tile_exists(origin.offset(dx, dy, dz)) {
                                    existing += 1;
                                }
                            }
                        }
                    }
                    if existing * 100 > volume * ROOM_OVERLAP_ABORT_PERCENT {
                        return StepResult::completed();
                    }
                }

                for dx in 0..width {
                    for dy in 0..height {
                        for dz in 0..depth {
                            let geometry =
                                if dy == 0 { TileGeometry::Floor } else { TileGeometry::Empty };
                            map.touch_tile(origin.offset(dx, dy, dz), geometry);
                        }
                    }
                }

                if self.rng.next_u64() % 100 < spawn_percent {
                    let key =
                        TileMap::key_from_index_coordinates(center.x, center.y, center.z);
                    map.register_hint(Hint::spawn_point(key));
                }

                let mut result = StepResult::completed();
                if width > 0 && depth > 0 {
                    result.nodes = wall_nodes(center, origin, width, depth);
                }
                result
            }
            Behavior::Turn { quarter_turns } => {
                self.direction = self.direction.rotated(*quarter_turns);
                StepResult::completed()
            }
            Behavior::Branch { prototypes } => {
                let prototypes = std::mem::take(prototypes);
                let branch_position = self.position;
                let branch_direction = self.direction;
                let mut result = StepResult::completed();
                result.spawned = prototypes
                    .iter()
                    .map(|prototype| prototype.copy_at(branch_position, branch_direction))
                    .collect();
                result
            }
            Behavior::Parallel { primary, extras } => {
                let mut result = primary.step(map);
                self.position = primary.position;
                self.direction = primary.direction;
                if result.complete {
                    let final_position = primary.position;
                    let final_direction = primary.direction;
                    for extra in std::mem::take(extras) {
                        result.spawned.push(extra.copy_at(final_position, final_direction));
                    }
                }
                result
            }
            Behavior::Spawn { percent, candidate } => {
                let percent = *percent;
                let roll = self.rng.next_u64() % 100;
                let mut result = StepResult::completed();
                if roll < percent {
                    result.spawned.push(candidate.copy_at(self.position, self.direction));
                }
                result
            }
        }
    }
}

/// One node per horizontal wall face, one cell outside it, facing outward.
fn wall_nodes(
    center: Coordinate,
    origin: Coordinate,
    width: i32,
    depth: i32,
) -> Vec<ExpansionNode> {
    vec![
        ExpansionNode::new(
            Coordinate::new(center.x, center.y, origin.z + depth),
            Direction::North,
            NodePriority::Optional,
            "room-wall",
        ),
        ExpansionNode::new(
            Coordinate::new(origin.x + width, center.y, center.z),
            Direction::East,
            NodePriority::Optional,
            "room-wall",
        ),
        ExpansionNode::new(
            Coordinate::new(center.x, center.y, origin.z - 1),
            Direction::South,
            NodePriority::Optional,
            "room-wall",
        ),
        ExpansionNode::new(
            Coordinate::new(origin.x - 1, center.y, center.z),
            Direction::West,
            NodePriority::Optional,
            "room-wall",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::map::HintKind;

    fn test_rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn run_to_completion(snail: &mut Snail, map: &mut TileMap) -> Vec<Snail> {
        let mut spawned = Vec::new();
        for _ in 0..200 {
            let result = snail.step(map);
            spawned.extend(result.spawned);
            if result.complete {
                return spawned;
            }
        }
        panic!("snail failed to complete within the step allowance");
    }

    fn variants_under_test() -> Vec<Snail> {
        let at = Coordinate::ORIGIN;
        vec![
            Snail::forward(at, Direction::East, test_rng(1), 4),
            Snail::room(at, Direction::North, test_rng(2), 5, 4, 5),
            Snail::turn(at, Direction::North, test_rng(3), 1),
            Snail::branch(at, Direction::North, test_rng(4), vec![Snail::turn(
                at,
                Direction::North,
                test_rng(5),
                -1,
            )]),
            Snail::parallel(Snail::forward(at, Direction::East, test_rng(6), 2), vec![
                Snail::turn(at, Direction::North, test_rng(7), 1),
            ]),
            Snail::maybe(
                at,
                Direction::North,
                test_rng(8),
                50,
                Snail::turn(at, Direction::North, test_rng(9), 1),
            ),
        ]
    }

    #[test]
    fn every_variant_is_inert_after_completion() {
        for mut snail in variants_under_test() {
            let mut map = TileMap::new();
            run_to_completion(&mut snail, &mut map);
            assert!(snail.is_complete());

            let fingerprint_before = map.fingerprint();
            let result = snail.step(&mut map);

            assert!(result.complete);
            assert!(result.spawned.is_empty());
            assert!(result.nodes.is_empty());
            assert_eq!(map.fingerprint(), fingerprint_before, "a completed snail must not carve");
        }
    }

    #[test]
    fn copies_do_not_alias_the_parent_position() {
        let mut map = TileMap::new();
        let mut original = Snail::forward(Coordinate::ORIGIN, Direction::East, test_rng(10), 5);
        let copy = original.copy_at(original.position(), original.direction());

        original.step(&mut map);

        assert_eq!(copy.position(), Coordinate::ORIGIN);
        assert_eq!(original.position(), Coordinate::new(1, 0, 0));
    }

    #[test]
    fn room_emits_four_outward_wall_nodes() {
        let mut map = TileMap::new();
        let mut room = Snail::room(Coordinate::ORIGIN, Direction::North, test_rng(11), 7, 4, 7);
        let result = room.step(&mut map);

        assert!(result.complete);
        assert_eq!(result.nodes.len(), 4);

        let mut placements: Vec<(Coordinate, Direction)> =
            result.nodes.iter().map(|node| (node.position, node.direction)).collect();
        placements.sort();
        let mut expected = vec![
            (Coordinate::new(0, 0, 4), Direction::North),
            (Coordinate::new(4, 0, 0), Direction::East),
            (Coordinate::new(0, 0, -4), Direction::South),
            (Coordinate::new(-4, 0, 0), Direction::West),
        ];
        expected.sort();
        assert_eq!(placements, expected);

        for node in &result.nodes {
            assert_eq!(node.priority, NodePriority::Optional);
            assert_eq!(node.source, "room-wall");
            assert!(!map.tile_exists(node.position), "wall nodes sit outside the carved volume");
        }
    }

    #[test]
    fn room_carves_its_full_volume() {
        let mut map = TileMap::new();
        let mut room = Snail::room(Coordinate::ORIGIN, Direction::North, test_rng(12), 7, 4, 7);
        room.step(&mut map);

        assert_eq!(map.tile_count(), 7 * 4 * 7);
        assert_eq!(
            map.tile(Coordinate::new(-3, 0, -3)).map(|tile| tile.geometry),
            Some(TileGeometry::Floor)
        );
        assert_eq!(
            map.tile(Coordinate::new(3, 3, 3)).map(|tile| tile.geometry),
            Some(TileGeometry::Empty)
        );
    }

    #[test]
    fn branch_spawns_one_positioned_copy_per_prototype() {
        let branch_point = Coordinate::new(2, 0, -1);
        let prototypes = vec![
            Snail::turn(Coordinate::ORIGIN, Direction::North, test_rng(13), -1),
            Snail::turn(Coordinate::ORIGIN, Direction::North, test_rng(14), 1),
            Snail::forward(Coordinate::ORIGIN, Direction::North, test_rng(15), 3),
        ];
        let mut branch = Snail::branch(branch_point, Direction::East, test_rng(16), prototypes);

        let mut map = TileMap::new();
        let result = branch.step(&mut map);

        assert!(result.complete);
        assert_eq!(result.spawned.len(), 3);
        for spawned in &result.spawned {
            assert_eq!(spawned.position(), branch_point);
            assert_eq!(spawned.direction(), Direction::East);
        }

        // Stepping one copy leaves its siblings untouched.
        let mut spawned = result.spawned;
        spawned[0].step(&mut map);
        assert_eq!(spawned[0].direction(), Direction::North);
        assert_eq!(spawned[1].direction(), Direction::East);
        assert_eq!(spawned[2].direction(), Direction::East);
    }

    #[test]
    fn parallel_defers_extras_until_the_primary_completes() {
        let primary = Snail::forward(Coordinate::ORIGIN, Direction::East, test_rng(17), 3);
        let extra = Snail::room(Coordinate::ORIGIN, Direction::North, test_rng(18), 3, 3, 3);
        let mut wrapper = Snail::parallel(primary, vec![extra]);

        let mut map = TileMap::new();
        for _ in 0..2 {
            let result = wrapper.step(&mut map);
            assert!(!result.complete);
            assert!(result.spawned.is_empty(), "extras must not surface early");
        }

        let result = wrapper.step(&mut map);
        assert!(result.complete);
        assert_eq!(result.spawned.len(), 1);
        assert_eq!(result.spawned[0].position(), Coordinate::new(3, 0, 0));
        assert_eq!(wrapper.position(), Coordinate::new(3, 0, 0));
    }

    #[test]
    fn parallel_wrapper_light_rolls_do_not_mirror_the_primary() {
        let mut map = TileMap::new();
        let primary = Snail::forward(Coordinate::ORIGIN, Direction::East, test_rng(26), 80);
        let mut wrapper = Snail::parallel(primary, Vec::new());
        run_to_completion(&mut wrapper, &mut map);

        // Wrapper and primary stand on the same cell every generation; with
        // a shared rng stream every light the primary places would reappear
        // at the same key with the same warmth.
        let mut warmth_counts: BTreeMap<(u64, u8), usize> = BTreeMap::new();
        for hint in map.hints() {
            if let HintKind::Light { warmth } = hint.kind {
                *warmth_counts.entry((hint.key, warmth)).or_default() += 1;
            }
        }
        assert!(!warmth_counts.is_empty(), "an 80-cell run places lights");
        assert!(
            warmth_counts.values().any(|&count| count == 1),
            "wrapper lights must not duplicate the primary's key and warmth"
        );
    }

    #[test]
    fn forward_carves_one_column_per_cell_of_distance() {
        let distance = 5;
        let mut map = TileMap::new();
        let mut forward =
            Snail::forward(Coordinate::ORIGIN, Direction::East, test_rng(19), distance);
        run_to_completion(&mut forward, &mut map);

        assert_eq!(map.tile_count() as u32, distance * 3);
        for x in 0..distance as i32 {
            assert_eq!(
                map.tile(Coordinate::new(x, 0, 0)).map(|tile| tile.geometry),
                Some(TileGeometry::Floor)
            );
            assert_eq!(
                map.tile(Coordinate::new(x, 1, 0)).map(|tile| tile.geometry),
                Some(TileGeometry::Empty)
            );
            assert_eq!(
                map.tile(Coordinate::new(x, 2, 0)).map(|tile| tile.geometry),
                Some(TileGeometry::Empty)
            );
        }
        assert_eq!(forward.position(), Coordinate::new(distance as i32, 0, 0));
    }

    #[test]
    fn spawn_decision_is_made_exactly_once() {
        let candidate = Snail::turn(Coordinate::ORIGIN, Direction::North, test_rng(20), 1);
        let mut always = Snail::maybe(
            Coordinate::new(1, 0, 1),
            Direction::South,
            test_rng(21),
            100,
            candidate.clone(),
        );
        let mut never =
            Snail::maybe(Coordinate::new(1, 0, 1), Direction::South, test_rng(22), 0, candidate);

        let mut map = TileMap::new();
        let spawned = always.step(&mut map);
        assert!(spawned.complete);
        assert_eq!(spawned.spawned.len(), 1);
        assert_eq!(spawned.spawned[0].position(), Coordinate::new(1, 0, 1));

        let skipped = never.step(&mut map);
        assert!(skipped.complete);
        assert!(skipped.spawned.is_empty());

        // Either way the decision is settled; later steps spawn nothing.
        assert!(always.step(&mut map).spawned.is_empty());
        assert!(never.step(&mut map).spawned.is_empty());
    }

    #[test]
    fn then_releases_the_follower_at_the_primary_terminus() {
        let follower = Snail::room(Coordinate::ORIGIN, Direction::North, test_rng(23), 3, 3, 3);
        let mut chain = Snail::forward(Coordinate::ORIGIN, Direction::North, test_rng(24), 2)
            .then(follower);

        let mut map = TileMap::new();
        let spawned = run_to_completion(&mut chain, &mut map);
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].position(), Coordinate::new(0, 0, 2));
        assert_eq!(spawned[0].direction(), Direction::North);
    }

    #[test]
    fn crowded_room_aborts_instead_of_recarving() {
        let mut map = TileMap::new();
        // Pre-carve a slab big enough to clear the leniency floor and fully
        // cover the room volume.
        for x in -6..=6 {
            for y in 0..4 {
                for z in -6..=6 {
                    map.touch_tile(Coordinate::new(x, y, z), TileGeometry::Empty);
                }
            }
        }
        let count_before = map.tile_count();
        assert!(count_before > ROOM_OVERLAP_LENIENCY_TILES);

        let mut room = Snail::room(Coordinate::ORIGIN, Direction::North, test_rng(25), 5, 4, 5);
        let result = room.step(&mut map);

        assert!(result.complete);
        assert!(result.nodes.is_empty(), "an aborted room claims no frontier");
        assert_eq!(map.tile_count(), count_before);
    }
}
