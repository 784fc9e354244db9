//! Simulation controller: turn order, round phases, status evaluation
//!
//! One round: agents act in ascending id order, then one spread step, then
//! flashover, then caught agents walk back out, then portraits replenish,
//! then the status is re-evaluated. Terminal status is sticky.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::Result;
use crate::core::types::{AgentId, GridPos, Round};
use crate::mansion::board::MansionBoard;
use crate::mansion::cell::{Hazard, Portrait, WallSegment};
use crate::mansion::config::BoardConfig;
use crate::sim::agent::{Agent, Role};
use crate::sim::constants::{
    DEFEAT_CASUALTIES, DEFEAT_DAMAGE, FALSE_ALARM_CAP, PORTRAIT_FLOOR, VICTIM_CAP,
    VICTORY_RESCUES,
};
use crate::sim::events::{Event, EventKind, EventLog};
use crate::sim::flashover::advance_flashover;
use crate::sim::propagation::advance_hazards;

/// Where the simulation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    #[default]
    InProgress,
    Victory,
    Defeat,
}

/// Why a defeat happened - diagnostics only, both map to the same terminal
/// state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeatReason {
    Casualties,
    StructuralCollapse,
}

/// The whole game: board, roster, randomness, log
#[derive(Debug, Clone)]
pub struct Simulation {
    board: MansionBoard,
    agents: Vec<Agent>,
    rng: ChaCha8Rng,
    round: Round,
    status: SimulationStatus,
    defeat_reason: Option<DefeatReason>,
    log: EventLog,
    victims_placed: u32,
    false_alarms_placed: u32,
    next_is_victim: bool,
    path_noise: bool,
}

impl Simulation {
    /// Build a simulation from a board configuration. Roles alternate
    /// rescuer/firefighter down the roster and spawn points cycle through
    /// the entrances, so any agent count spreads over both.
    pub fn new(config: &BoardConfig, agent_count: usize, seed: u64) -> Result<Self> {
        let board = MansionBoard::from_config(config)?;

        let mut agents = Vec::with_capacity(agent_count);
        for idx in 0..agent_count {
            let entrance = board.entrances()[idx % board.entrances().len()];
            let staging = board.staging_cell(entrance);
            let role = if idx % 2 == 0 {
                Role::Rescuer
            } else {
                Role::Firefighter
            };
            agents.push(Agent::new(AgentId(idx as u32), role, staging));
        }

        Ok(Self {
            board,
            agents,
            rng: ChaCha8Rng::seed_from_u64(seed),
            round: 0,
            status: SimulationStatus::InProgress,
            defeat_reason: None,
            log: EventLog::new(),
            victims_placed: config.victims.len() as u32,
            false_alarms_placed: config.false_alarms.len() as u32,
            next_is_victim: true,
            path_noise: true,
        })
    }

    /// Disable the planner's random tie-breaking for fully reproducible runs
    pub fn set_path_noise(&mut self, enabled: bool) {
        self.path_noise = enabled;
    }

    /// Advance one full round. No-op once the status is terminal.
    pub fn step(&mut self) {
        if self.is_finished() {
            return;
        }
        self.round += 1;
        debug!(round = self.round, "round start");

        for agent in &mut self.agents {
            let noise = if self.path_noise {
                Some(&mut self.rng)
            } else {
                None
            };
            agent.take_turn(&mut self.board, noise, &mut self.log, self.round);
        }

        advance_hazards(&mut self.board, &mut self.rng, &mut self.log, self.round);
        advance_flashover(&mut self.board, &mut self.log, self.round);
        self.reset_caught_agents();
        self.replenish_portraits();
        self.evaluate_status();
    }

    /// Re-derive the status from the counters. Idempotent; a terminal status
    /// never changes again.
    pub fn evaluate_status(&mut self) -> SimulationStatus {
        if self.status != SimulationStatus::InProgress {
            return self.status;
        }
        if self.board.casualties() >= DEFEAT_CASUALTIES {
            self.finish(SimulationStatus::Defeat, Some(DefeatReason::Casualties));
        } else if self.board.damage_counter() >= DEFEAT_DAMAGE {
            self.finish(
                SimulationStatus::Defeat,
                Some(DefeatReason::StructuralCollapse),
            );
        } else if self.board.rescued() >= VICTORY_RESCUES {
            self.finish(SimulationStatus::Victory, None);
        }
        self.status
    }

    fn finish(&mut self, status: SimulationStatus, reason: Option<DefeatReason>) {
        self.status = status;
        self.defeat_reason = reason;
        info!(?status, ?reason, round = self.round, "simulation over");
        self.log.push(self.round, EventKind::GameOver { status, reason });
    }

    /// Any agent standing on a burning cell is sent back to its staging
    /// cell, dropping whatever it carried.
    fn reset_caught_agents(&mut self) {
        for agent in &mut self.agents {
            if self.board.hazard(agent.position()) == Hazard::Fire {
                info!(agent = agent.id().0, position = ?agent.position(), "caught by fire");
                self.log.push(
                    self.round,
                    EventKind::AgentCaught {
                        agent: agent.id(),
                        position: agent.position(),
                    },
                );
                agent.reset_to_staging();
            }
        }
    }

    /// Keep at least three portraits in play, alternating victims and false
    /// alarms until the per-game caps run out. Placing one on a hazardous
    /// cell clears the hazard first.
    fn replenish_portraits(&mut self) {
        while self.board.portrait_cells().len() < PORTRAIT_FLOOR {
            let portrait = if self.next_is_victim && self.victims_placed < VICTIM_CAP {
                Portrait::Victim
            } else if !self.next_is_victim && self.false_alarms_placed < FALSE_ALARM_CAP {
                Portrait::FalseAlarm
            } else if self.victims_placed < VICTIM_CAP {
                Portrait::Victim
            } else if self.false_alarms_placed < FALSE_ALARM_CAP {
                Portrait::FalseAlarm
            } else {
                break; // caps exhausted
            };

            let candidates: Vec<GridPos> = self
                .board
                .interior_cells()
                .filter(|pos| self.board.portrait_at(*pos).is_none())
                .collect();
            if candidates.is_empty() {
                break;
            }
            let position = candidates[self.rng.gen_range(0..candidates.len())];

            let cleared_hazard = self.board.hazard(position) != Hazard::Clear;
            if cleared_hazard {
                self.board.set_hazard(position, Hazard::Clear);
            }
            self.board.set_portrait(position, portrait);
            match portrait {
                Portrait::Victim => {
                    self.victims_placed += 1;
                    self.next_is_victim = false;
                }
                Portrait::FalseAlarm => {
                    self.false_alarms_placed += 1;
                    self.next_is_victim = true;
                }
            }
            debug!(?position, ?portrait, "portrait added");
            self.log.push(
                self.round,
                EventKind::PortraitAdded {
                    position,
                    portrait,
                    cleared_hazard,
                },
            );
        }
    }

    // ===== Query surface =====

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != SimulationStatus::InProgress
    }

    pub fn defeat_reason(&self) -> Option<DefeatReason> {
        self.defeat_reason
    }

    pub fn round_index(&self) -> Round {
        self.round
    }

    pub fn damage_counter(&self) -> u32 {
        self.board.damage_counter()
    }

    pub fn rescued_count(&self) -> u32 {
        self.board.rescued()
    }

    pub fn casualties_count(&self) -> u32 {
        self.board.casualties()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn board(&self) -> &MansionBoard {
        &self.board
    }

    pub fn cell_hazard(&self, pos: GridPos) -> Hazard {
        self.board.hazard(pos)
    }

    pub fn cell_walls(&self, pos: GridPos) -> [WallSegment; 4] {
        self.board.walls_at(pos)
    }

    pub fn portrait_at(&self, pos: GridPos) -> Option<Portrait> {
        self.board.portrait_at(pos)
    }

    pub fn events(&self) -> &[Event] {
        self.log.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        let mut sim = Simulation::new(&BoardConfig::reference_layout(), 6, 31).unwrap();
        sim.set_path_noise(false);
        sim
    }

    #[test]
    fn test_roster_alternates_roles_and_entrances() {
        let sim = sim();
        assert_eq!(sim.agents().len(), 6);
        assert_eq!(sim.agents()[0].role(), Role::Rescuer);
        assert_eq!(sim.agents()[1].role(), Role::Firefighter);
        assert_eq!(sim.agents()[2].role(), Role::Rescuer);

        // Spawn points cycle through the four entrances
        assert_eq!(sim.agents()[0].position(), GridPos::new(0, 3));
        assert_eq!(sim.agents()[1].position(), GridPos::new(9, 4));
        assert_eq!(sim.agents()[2].position(), GridPos::new(4, 0));
        assert_eq!(sim.agents()[3].position(), GridPos::new(6, 7));
        assert_eq!(sim.agents()[4].position(), GridPos::new(0, 3));
    }

    #[test]
    fn test_evaluate_status_is_idempotent() {
        let mut sim = sim();
        let first = sim.evaluate_status();
        let second = sim.evaluate_status();
        assert_eq!(first, second);
        assert_eq!(first, SimulationStatus::InProgress);
    }

    #[test]
    fn test_defeat_by_casualties_records_reason() {
        let mut sim = sim();
        for _ in 0..4 {
            sim.board.record_casualty();
        }
        assert_eq!(sim.evaluate_status(), SimulationStatus::Defeat);
        assert_eq!(sim.defeat_reason(), Some(DefeatReason::Casualties));

        // Terminal status sticks, and the game-over event fires only once
        assert_eq!(sim.evaluate_status(), SimulationStatus::Defeat);
        let game_overs = sim
            .events()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_defeat_by_structural_damage_records_reason() {
        let mut sim = sim();
        // Chew through perimeter walls until the structure gives out
        'outer: for x in 1..=8 {
            for target in [GridPos::new(x, 0), GridPos::new(x, 7)] {
                let inner = sim.board.inward_step(target).unwrap();
                sim.board.damage_wall(inner, target);
                sim.board.damage_wall(inner, target);
                if sim.board.damage_counter() >= DEFEAT_DAMAGE {
                    break 'outer;
                }
            }
        }
        assert!(sim.board.damage_counter() >= DEFEAT_DAMAGE);
        assert_eq!(sim.evaluate_status(), SimulationStatus::Defeat);
        assert_eq!(sim.defeat_reason(), Some(DefeatReason::StructuralCollapse));
    }

    #[test]
    fn test_victory_at_seven_rescues() {
        let mut sim = sim();
        for _ in 0..7 {
            sim.board.record_rescue();
        }
        assert_eq!(sim.evaluate_status(), SimulationStatus::Victory);
        assert_eq!(sim.defeat_reason(), None);
    }

    #[test]
    fn test_step_is_noop_after_terminal() {
        let mut sim = sim();
        for _ in 0..4 {
            sim.board.record_casualty();
        }
        sim.evaluate_status();
        let round = sim.round_index();
        let events = sim.events().len();

        sim.step();

        assert_eq!(sim.round_index(), round);
        assert_eq!(sim.events().len(), events);
    }

    #[test]
    fn test_replenishment_restores_floor_alternating() {
        let mut sim = sim();
        for pos in sim.board.portrait_cells() {
            sim.board.take_portrait(pos);
        }

        sim.replenish_portraits();

        assert_eq!(sim.board.portrait_cells().len(), PORTRAIT_FLOOR);
        let added: Vec<Portrait> = sim
            .events()
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::PortraitAdded { portrait, .. } => Some(portrait),
                _ => None,
            })
            .collect();
        assert_eq!(
            added,
            vec![Portrait::Victim, Portrait::FalseAlarm, Portrait::Victim]
        );
    }

    #[test]
    fn test_replenishment_stops_at_caps() {
        let mut sim = sim();
        for pos in sim.board.portrait_cells() {
            sim.board.take_portrait(pos);
        }
        sim.victims_placed = VICTIM_CAP;
        sim.false_alarms_placed = FALSE_ALARM_CAP;

        sim.replenish_portraits();

        assert!(sim.board.portrait_cells().is_empty());
    }

    #[test]
    fn test_replenishment_clears_hazard_under_new_portrait() {
        let mut sim = sim();
        for pos in sim.board.portrait_cells() {
            sim.board.take_portrait(pos);
        }
        // Everything burns, so wherever portraits land a hazard was cleared
        let cells: Vec<GridPos> = sim.board.interior_cells().collect();
        for pos in cells {
            sim.board.set_hazard(pos, Hazard::Fire);
        }

        sim.replenish_portraits();

        for pos in sim.board.portrait_cells() {
            assert_eq!(sim.board.hazard(pos), Hazard::Clear);
        }
        assert!(sim.events().iter().any(|e| matches!(
            e.kind,
            EventKind::PortraitAdded {
                cleared_hazard: true,
                ..
            }
        )));
    }

    #[test]
    fn test_caught_agent_walks_back_out_empty_handed() {
        let mut sim = sim();
        sim.step();
        let agent = &sim.agents[0];
        let position = agent.position();
        assert!(
            sim.board.interior_contains(position),
            "agent enters on its first turn"
        );
        let staging = GridPos::new(0, 3);

        sim.board.set_hazard(position, Hazard::Fire);
        sim.reset_caught_agents();

        let agent = &sim.agents[0];
        assert_eq!(agent.position(), staging);
        assert!(!agent.carrying_victim());
        assert!(!agent.has_entered_interior());
        assert!(sim.events().iter().any(|e| matches!(
            e.kind,
            EventKind::AgentCaught { agent: id, .. } if id == AgentId(0)
        )));
    }

    #[test]
    fn test_same_seed_same_run() {
        let config = BoardConfig::reference_layout();
        let mut a = Simulation::new(&config, 6, 99).unwrap();
        let mut b = Simulation::new(&config, 6, 99).unwrap();

        for _ in 0..20 {
            a.step();
            b.step();
        }

        assert_eq!(a.events(), b.events());
        assert_eq!(a.status(), b.status());
        for (left, right) in a.agents().iter().zip(b.agents()) {
            assert_eq!(left.position(), right.position());
        }
    }

    #[test]
    fn test_counters_never_linger_past_thresholds() {
        let mut sim = sim();
        for _ in 0..60 {
            sim.step();
            if sim.status() == SimulationStatus::InProgress {
                assert!(sim.casualties_count() < DEFEAT_CASUALTIES);
                assert!(sim.damage_counter() < DEFEAT_DAMAGE);
                assert!(sim.rescued_count() < VICTORY_RESCUES);
            }
        }
    }
}
