//! Fire and smoke spread: the once-per-round hazard advance
//!
//! One randomly chosen playable cell escalates each round. A cell that is
//! already burning explodes instead: each cardinal direction carries a chain
//! that ignites the first non-burning cell it reaches, damages whatever
//! blocks it, and rolls through cells that are already on fire.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::core::types::{Direction, GridPos, Round};
use crate::mansion::board::{MansionBoard, WallDamageOutcome};
use crate::mansion::cell::Hazard;
use crate::sim::events::{EventKind, EventLog};

/// Escalate one random cell of the playable area
pub fn advance_hazards(
    board: &mut MansionBoard,
    rng: &mut ChaCha8Rng,
    log: &mut EventLog,
    round: Round,
) {
    let cells: Vec<GridPos> = board.interior_cells().collect();
    let target = cells[rng.gen_range(0..cells.len())];

    match board.hazard(target) {
        Hazard::Clear => {
            board.set_hazard(target, Hazard::Smoke);
            debug!(?target, "smoke appears");
            log.push(round, EventKind::SmokeAdded { position: target });
        }
        Hazard::Smoke => {
            board.set_hazard(target, Hazard::Fire);
            debug!(?target, "smoke ignites");
            log.push(round, EventKind::SmokeToFire { position: target });
        }
        Hazard::Fire => explode(board, target, log, round),
    }
}

/// Explosion at a cell that was already burning.
///
/// Each of the four directions is walked as an explicit chain: a blocked
/// boundary takes structural damage and stops the chain; the first clear or
/// smoky cell catches fire and stops it; a burning cell passes the chain
/// one cell further in the same direction. The visited set guards against
/// any possibility of revisiting, so termination does not depend on board
/// contents.
pub fn explode(board: &mut MansionBoard, origin: GridPos, log: &mut EventLog, round: Round) {
    debug!(?origin, "explosion");
    for dir in Direction::ALL {
        let mut visited: HashSet<GridPos> = HashSet::from([origin]);
        let mut from = origin;
        loop {
            let target = from.step(dir);
            if !board.in_bounds(target) || !visited.insert(target) {
                break;
            }
            if board.passage_blocked(from, target) {
                register_structural_damage(board, from, target, log, round);
                break;
            }
            if !board.interior_contains(target) {
                break; // corridors never burn
            }
            match board.hazard(target) {
                Hazard::Clear | Hazard::Smoke => {
                    board.set_hazard(target, Hazard::Fire);
                    log.push(round, EventKind::FireExtended { from, to: target });
                    break;
                }
                Hazard::Fire => {
                    from = target;
                }
            }
        }
    }
}

/// Fire hit a blocked boundary: a closed door is blown off its hinges, a
/// wall takes one hit.
fn register_structural_damage(
    board: &mut MansionBoard,
    from: GridPos,
    target: GridPos,
    log: &mut EventLog,
    round: Round,
) {
    if board.door_blocked(from, target) {
        board.destroy_door(from, target);
        debug!(?from, ?target, "door destroyed by fire");
        log.push(round, EventKind::DoorDestroyed { a: from, b: target });
        return;
    }
    match board.damage_wall(from, target) {
        WallDamageOutcome::Weakened => log.push(
            round,
            EventKind::DamageWall {
                actor: None,
                a: from,
                b: target,
            },
        ),
        WallDamageOutcome::Destroyed => log.push(
            round,
            EventKind::WallDestroyed {
                actor: None,
                a: from,
                b: target,
            },
        ),
        WallDamageOutcome::AlreadyOpen => {}
    }
}
