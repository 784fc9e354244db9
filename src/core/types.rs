//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};

/// Stable identifier for an agent, assigned in roster order at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Round counter (one full pass of agent turns plus propagation)
pub type Round = u32;

/// Integer cell coordinate on the mansion grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell
    pub fn manhattan(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The adjacent cell one step in the given direction
    pub fn step(&self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// All 4 neighboring coordinates, in `Direction::ALL` order
    pub fn neighbors(&self) -> [GridPos; 4] {
        [
            self.step(Direction::North),
            self.step(Direction::West),
            self.step(Direction::South),
            self.step(Direction::East),
        ]
    }

    /// Direction from this cell to an adjacent one; `None` if not adjacent
    pub fn direction_to(&self, other: &Self) -> Option<Direction> {
        match (other.x - self.x, other.y - self.y) {
            (0, -1) => Some(Direction::North),
            (-1, 0) => Some(Direction::West),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            _ => None,
        }
    }
}

/// Cardinal direction; the discriminant order matches the wall-segment layout
/// (north, west, south, east) carried by every cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    West,
    South,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
    ];

    /// Get the coordinate offset for this direction (y grows southward)
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
        }
    }

    /// Index into a cell's wall-segment array
    pub fn index(&self) -> usize {
        *self as usize
    }
}
