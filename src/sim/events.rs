//! Append-only event log emitted by the engine
//!
//! Every state change produces exactly one event with a fixed payload shape
//! per kind. Consumers (replay tooling, serving layers) read the sequence;
//! the engine never reads it back to influence behavior.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, GridPos, Round};
use crate::mansion::cell::Portrait;
use crate::sim::controller::{DefeatReason, SimulationStatus};

/// Everything that can happen on the board, tagged for JSON consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    AgentMove {
        agent: AgentId,
        from: GridPos,
        to: GridPos,
    },
    FireExtinguished {
        agent: AgentId,
        position: GridPos,
    },
    /// An agent with a single point left knocks fire down to smoke
    FireReduced {
        agent: AgentId,
        position: GridPos,
    },
    SmokeExtinguished {
        agent: AgentId,
        position: GridPos,
    },
    /// A wall segment absorbed a hit but still stands
    DamageWall {
        actor: Option<AgentId>,
        a: GridPos,
        b: GridPos,
    },
    WallDestroyed {
        actor: Option<AgentId>,
        a: GridPos,
        b: GridPos,
    },
    OpenDoor {
        agent: AgentId,
        a: GridPos,
        b: GridPos,
    },
    CloseDoor {
        agent: AgentId,
        a: GridPos,
        b: GridPos,
    },
    /// Fire took out a closed door; the boundary is permanently open
    DoorDestroyed {
        a: GridPos,
        b: GridPos,
    },
    /// An agent examined a portrait and learned what it was
    PortraitFound {
        agent: AgentId,
        position: GridPos,
        portrait: Portrait,
    },
    /// A carried victim was delivered at an entrance
    RescuedPortrait {
        agent: AgentId,
        position: GridPos,
        total_rescued: u32,
    },
    PortraitAdded {
        position: GridPos,
        portrait: Portrait,
        cleared_hazard: bool,
    },
    /// A victim was destroyed by fire
    PortraitLost {
        position: GridPos,
    },
    SmokeAdded {
        position: GridPos,
    },
    SmokeToFire {
        position: GridPos,
    },
    FireExtended {
        from: GridPos,
        to: GridPos,
    },
    /// An agent's cell caught fire; it was sent back to its staging cell
    AgentCaught {
        agent: AgentId,
        position: GridPos,
    },
    GameOver {
        status: SimulationStatus,
        reason: Option<DefeatReason>,
    },
}

/// One entry of the ordered log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub round: Round,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Append-only ordered record of everything that happened
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, round: Round, kind: EventKind) {
        self.events.push(Event { round, kind });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
