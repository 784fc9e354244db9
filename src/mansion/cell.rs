//! Per-cell state: hazard level, portrait markers, wall segments

use serde::{Deserialize, Serialize};

/// Fire state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    #[default]
    Clear,
    Smoke,
    Fire,
}

impl Hazard {
    /// Extra movement cost the path planner charges for entering this cell
    pub fn traversal_surcharge(&self) -> u32 {
        match self {
            Hazard::Clear => 0,
            Hazard::Smoke => 1,
            Hazard::Fire => 2,
        }
    }
}

/// What a portrait marker turns out to be when examined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portrait {
    Victim,
    FalseAlarm,
}

/// One side of a shared wall boundary.
///
/// The same segment state is mirrored on both adjacent cells; mutation goes
/// through [`MansionBoard`](crate::mansion::MansionBoard) so the two sides
/// never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WallSegment {
    /// The segment currently blocks movement
    pub present: bool,
    /// The segment has absorbed one hit but still stands
    pub damaged: bool,
}

/// State of a registered door pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Open,
    Closed,
}

/// A single cell of the mansion grid
///
/// Border cells are movement-only corridors: they keep the default clear
/// hazard, never hold a portrait, and carry no wall data of their own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    pub hazard: Hazard,
    pub portrait: Option<Portrait>,
    /// Wall segments indexed by [`Direction`](crate::core::Direction)
    pub walls: [WallSegment; 4],
}
