use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct HintId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, z: self.z + dz }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 6] =
        [Self::North, Self::East, Self::South, Self::West, Self::Up, Self::Down];
    pub const HORIZONTAL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    pub fn unit_offset(self) -> (i32, i32, i32) {
        match self {
            Self::North => (0, 0, 1),
            Self::East => (1, 0, 0),
            Self::South => (0, 0, -1),
            Self::West => (-1, 0, 0),
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
        }
    }

    pub fn advance(self, from: Coordinate) -> Coordinate {
        let (dx, dy, dz) = self.unit_offset();
        from.offset(dx, dy, dz)
    }

    /// Rotation about the vertical axis; Up and Down are fixed points.
    pub fn rotated(self, quarter_turns: i32) -> Self {
        const RING: [Direction; 4] =
            [Direction::North, Direction::East, Direction::South, Direction::West];
        let Some(index) = RING.iter().position(|&direction| direction == self) else {
            return self;
        };
        RING[(index as i32 + quarter_turns).rem_euclid(4) as usize]
    }

    pub fn is_horizontal(self) -> bool {
        !matches!(self, Self::Up | Self::Down)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileGeometry {
    Empty,
    Full,
    Floor,
}
