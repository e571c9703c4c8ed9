//! Frontier markers describing where and in what direction generation may continue.

use crate::types::{Coordinate, Direction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodePriority {
    Necessary,
    Optional,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpansionNode {
    pub position: Coordinate,
    pub direction: Direction,
    pub priority: NodePriority,
    pub source: &'static str,
    consumed: bool,
}

impl ExpansionNode {
    pub fn new(
        position: Coordinate,
        direction: Direction,
        priority: NodePriority,
        source: &'static str,
    ) -> Self {
        Self { position, direction, priority, source, consumed: false }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Marked exactly once, by the orchestrator, when the node seeds a follow-up agent.
    pub fn consume(&mut self) {
        debug_assert!(!self.consumed, "an expansion node is consumed at most once");
        self.consumed = true;
    }
}
