//! Weighted snail templates: how a consumed expansion node becomes a new agent.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::types::{Coordinate, Direction};

use super::node::ExpansionNode;
use super::snail::{Snail, fork_rng};
use super::tuning::LevelProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SnailTemplate {
    Chamber,
    Hallway,
    Fork,
    SideGallery,
    GambledNook,
}

pub(super) struct SnailCatalog {
    weighted: Vec<(u64, SnailTemplate)>,
}

impl SnailCatalog {
    pub(super) fn for_profile(profile: LevelProfile) -> Self {
        let weighted = match profile {
            LevelProfile::Burrows => vec![
                (30, SnailTemplate::Hallway),
                (25, SnailTemplate::Chamber),
                (20, SnailTemplate::Fork),
                (15, SnailTemplate::GambledNook),
                (10, SnailTemplate::SideGallery),
            ],
            LevelProfile::Halls => vec![
                (40, SnailTemplate::Chamber),
                (30, SnailTemplate::Hallway),
                (15, SnailTemplate::SideGallery),
                (10, SnailTemplate::Fork),
                (5, SnailTemplate::GambledNook),
            ],
            LevelProfile::Tangles => vec![
                (35, SnailTemplate::Fork),
                (25, SnailTemplate::Hallway),
                (20, SnailTemplate::SideGallery),
                (10, SnailTemplate::Chamber),
                (10, SnailTemplate::GambledNook),
            ],
        };
        Self { weighted }
    }

    /// `None` drops the node: generation absorbs unmatched frontiers silently.
    pub(super) fn build(&self, node: &ExpansionNode, mut rng: ChaCha8Rng) -> Option<Snail> {
        let total: u64 = self.weighted.iter().map(|(weight, _)| weight).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.next_u64() % total;
        let mut chosen = None;
        for (weight, template) in &self.weighted {
            if roll < *weight {
                chosen = Some(*template);
                break;
            }
            roll -= weight;
        }
        chosen.map(|template| instantiate(template, node.position, node.direction, rng))
    }
}

fn instantiate(
    template: SnailTemplate,
    position: Coordinate,
    direction: Direction,
    mut rng: ChaCha8Rng,
) -> Snail {
    match template {
        SnailTemplate::Chamber => {
            let width = roll_range(&mut rng, 5, 9);
            let depth = roll_range(&mut rng, 5, 9);
            Snail::room(position, direction, rng, width, 4, depth)
        }
        SnailTemplate::Hallway => {
            let length = roll_range(&mut rng, 3, 8) as u32;
            let width = roll_range(&mut rng, 5, 7);
            let depth = roll_range(&mut rng, 5, 7);
            let chamber = Snail::room(position, direction, fork_rng(&mut rng), width, 4, depth);
            Snail::forward(position, direction, rng, length).then(chamber)
        }
        SnailTemplate::Fork => {
            let stem_length = roll_range(&mut rng, 2, 5) as u32;
            let left = fork_arm(position, direction, &mut rng, -1);
            let right = fork_arm(position, direction, &mut rng, 1);
            let junction = Snail::branch(position, direction, fork_rng(&mut rng), vec![
                left, right,
            ]);
            Snail::forward(position, direction, rng, stem_length).then(junction)
        }
        SnailTemplate::SideGallery => {
            let run_length = roll_range(&mut rng, 4, 7) as u32;
            let main_chamber =
                Snail::room(position, direction, fork_rng(&mut rng), 6, 4, 6);
            let gallery = fork_arm(position, direction, &mut rng, 1);
            Snail::forward(position, direction, rng, run_length)
                .then_all(vec![main_chamber, gallery])
        }
        SnailTemplate::GambledNook => {
            let approach = roll_range(&mut rng, 2, 4) as u32;
            let nook = Snail::forward(position, direction, fork_rng(&mut rng), approach)
                .then(Snail::room(position, direction, fork_rng(&mut rng), 3, 3, 3));
            let turned = Snail::turn(position, direction, fork_rng(&mut rng), 1).then(nook);
            Snail::maybe(position, direction, rng, 50, turned)
        }
    }
}

/// A turned corridor ending in a small chamber; the building block for
/// forks and side galleries.
fn fork_arm(
    position: Coordinate,
    direction: Direction,
    rng: &mut ChaCha8Rng,
    quarter_turns: i32,
) -> Snail {
    let arm_length = roll_range(rng, 3, 6) as u32;
    let run = Snail::forward(position, direction, fork_rng(rng), arm_length)
        .then(Snail::room(position, direction, fork_rng(rng), 5, 4, 5));
    Snail::turn(position, direction, fork_rng(rng), quarter_turns).then(run)
}

fn roll_range(rng: &mut ChaCha8Rng, min_value: i32, max_value: i32) -> i32 {
    debug_assert!(min_value <= max_value);
    let range_size = (max_value - min_value + 1) as u64;
    min_value + (rng.next_u64() % range_size) as i32
}
