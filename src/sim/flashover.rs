//! Flashover: smoke next to fire ignites, fire consumes portraits
//!
//! Runs once per round after all agents have acted. Conversion works from a
//! snapshot of the fire set, so the outcome is independent of iteration
//! order: a smoke cell two steps from fire survives this round even if the
//! cell between them converts.

use std::collections::HashSet;

use tracing::debug;

use crate::core::types::{GridPos, Round};
use crate::mansion::board::MansionBoard;
use crate::mansion::cell::{Hazard, Portrait};
use crate::sim::events::{EventKind, EventLog};

pub fn advance_flashover(board: &mut MansionBoard, log: &mut EventLog, round: Round) {
    let fires: HashSet<GridPos> = board
        .interior_cells()
        .filter(|p| board.hazard(*p) == Hazard::Fire)
        .collect();
    let smokes: Vec<GridPos> = board
        .interior_cells()
        .filter(|p| board.hazard(*p) == Hazard::Smoke)
        .collect();

    for smoke in smokes {
        let ignites = smoke
            .neighbors()
            .iter()
            .any(|n| fires.contains(n) && !board.passage_blocked(smoke, *n));
        if ignites {
            board.set_hazard(smoke, Hazard::Fire);
            debug!(position = ?smoke, "flashover");
            log.push(round, EventKind::SmokeToFire { position: smoke });
        }
    }

    // Fire destroys whatever portraits it has reached. Lost victims count
    // as casualties; false alarms burn silently.
    for pos in board.portrait_cells() {
        if board.hazard(pos) == Hazard::Fire {
            if let Some(Portrait::Victim) = board.take_portrait(pos) {
                board.record_casualty();
                debug!(position = ?pos, "victim lost to fire");
                log.push(round, EventKind::PortraitLost { position: pos });
            }
        }
    }
}
