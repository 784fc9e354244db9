//! Agent roles and the per-turn action loop
//!
//! An agent spends a four-point budget each turn on moving, dousing
//! hazards, breaking walls and working doors on the way to its role's
//! objective. Unspent points are lost when the turn ends - the budget never
//! carries over.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{AgentId, GridPos, Round};
use crate::mansion::board::{MansionBoard, WallDamageOutcome};
use crate::mansion::cell::{Hazard, Portrait};
use crate::sim::constants::{
    BREAK_WALL_COST, CARRY_MOVE_COST, DOOR_TOGGLE_COST, EXTINGUISH_FIRE_COST,
    EXTINGUISH_SMOKE_COST, MOVE_COST, TURN_ACTION_POINTS,
};
use crate::sim::events::{EventKind, EventLog};
use crate::sim::pathfinding::plan_route;

/// What an agent does for a living
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Rescuer,
    Firefighter,
}

/// Outcome of one attempt to advance toward a goal set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    /// Spent points on a step or on clearing the obstacle in the way
    Progressed,
    /// Already standing on a goal cell
    Arrived,
    /// No route, or the next action is unaffordable this turn
    Stuck,
}

/// One member of the rescue team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    role: Role,
    position: GridPos,
    action_points: u32,
    carrying_victim: bool,
    has_entered_interior: bool,
    /// Exterior corridor cell the agent spawned on and returns to when caught
    staging: GridPos,
    move_history: Vec<GridPos>,
    action_history: Vec<String>,
}

impl Agent {
    pub fn new(id: AgentId, role: Role, staging: GridPos) -> Self {
        Self {
            id,
            role,
            position: staging,
            action_points: TURN_ACTION_POINTS,
            carrying_victim: false,
            has_entered_interior: false,
            staging,
            move_history: vec![staging],
            action_history: Vec::new(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn action_points(&self) -> u32 {
        self.action_points
    }

    pub fn carrying_victim(&self) -> bool {
        self.carrying_victim
    }

    pub fn has_entered_interior(&self) -> bool {
        self.has_entered_interior
    }

    pub fn move_history(&self) -> &[GridPos] {
        &self.move_history
    }

    pub fn action_history(&self) -> &[String] {
        &self.action_history
    }

    /// Run one full turn, then restore the action-point budget
    pub fn take_turn(
        &mut self,
        board: &mut MansionBoard,
        mut noise: Option<&mut ChaCha8Rng>,
        log: &mut EventLog,
        round: Round,
    ) {
        debug!(
            agent = self.id.0,
            role = ?self.role,
            position = ?self.position,
            "turn start"
        );
        match self.role {
            Role::Rescuer => self.rescuer_turn(board, &mut noise, log, round),
            Role::Firefighter => self.firefighter_turn(board, &mut noise, log, round),
        }
        debug!(agent = self.id.0, leftover = self.action_points, "turn end");
        self.action_points = TURN_ACTION_POINTS;
    }

    /// Send the agent back outside after its cell caught fire
    pub fn reset_to_staging(&mut self) {
        self.carrying_victim = false;
        self.has_entered_interior = false;
        self.position = self.staging;
        self.move_history.push(self.staging);
    }

    fn rescuer_turn(
        &mut self,
        board: &mut MansionBoard,
        noise: &mut Option<&mut ChaCha8Rng>,
        log: &mut EventLog,
        round: Round,
    ) {
        while self.action_points > 0 {
            if !self.has_entered_interior {
                if self.enter_interior(board, log, round) {
                    continue;
                }
                break;
            }
            if self.douse_adjacent_hazard(board, log, round) {
                continue;
            }

            if self.carrying_victim {
                let exits = board.entrances().to_vec();
                match self.advance_towards(board, &exits, noise, log, round) {
                    StepOutcome::Arrived => self.deliver_victim(board, log, round),
                    StepOutcome::Progressed => {}
                    StepOutcome::Stuck => break,
                }
            } else {
                let portraits = board.portrait_cells();
                if portraits.is_empty() {
                    break; // nothing left to search for
                }
                match self.advance_towards(board, &portraits, noise, log, round) {
                    StepOutcome::Arrived => self.examine_portrait(board, log, round),
                    StepOutcome::Progressed => {}
                    StepOutcome::Stuck => break,
                }
            }
        }
    }

    fn firefighter_turn(
        &mut self,
        board: &mut MansionBoard,
        noise: &mut Option<&mut ChaCha8Rng>,
        log: &mut EventLog,
        round: Round,
    ) {
        while self.action_points > 0 {
            if !self.has_entered_interior {
                if self.enter_interior(board, log, round) {
                    continue;
                }
                break;
            }
            if self.douse_adjacent_hazard(board, log, round) {
                continue;
            }

            let hazards = board.hazard_cells();
            if hazards.is_empty() {
                break;
            }
            match self.advance_towards(board, &hazards, noise, log, round) {
                StepOutcome::Arrived => {
                    if !self.douse_standing_hazard(board, log, round) {
                        break;
                    }
                }
                StepOutcome::Progressed => {}
                StepOutcome::Stuck => break,
            }
        }
    }

    /// The forced first step from the staging cell into the playable area.
    /// Fire on the doorway cell is put out before stepping in. Returns false
    /// when the remaining points cannot pay for it.
    fn enter_interior(&mut self, board: &mut MansionBoard, log: &mut EventLog, round: Round) -> bool {
        let Some(next) = board.inward_step(self.position) else {
            self.has_entered_interior = true;
            return true;
        };
        if board.hazard(next) == Hazard::Fire {
            if self.action_points < EXTINGUISH_FIRE_COST {
                return false;
            }
            self.extinguish_fire(board, next, log, round);
        }
        if self.action_points < MOVE_COST {
            return false;
        }
        self.move_step(next, log, round);
        self.has_entered_interior = true;
        true
    }

    /// Hose down the first burning or smoky neighbor in reach. Returns true
    /// when points were spent.
    fn douse_adjacent_hazard(
        &mut self,
        board: &mut MansionBoard,
        log: &mut EventLog,
        round: Round,
    ) -> bool {
        for neighbor in board.neighbors(self.position) {
            if board.passage_blocked(self.position, neighbor) {
                continue;
            }
            match board.hazard(neighbor) {
                Hazard::Fire if self.action_points >= EXTINGUISH_FIRE_COST => {
                    self.extinguish_fire(board, neighbor, log, round);
                    return true;
                }
                Hazard::Smoke if self.action_points >= EXTINGUISH_SMOKE_COST => {
                    self.extinguish_smoke(board, neighbor, log, round);
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Deal with the hazard under the agent's feet. Returns false when it
    /// cannot afford to act on it.
    fn douse_standing_hazard(
        &mut self,
        board: &mut MansionBoard,
        log: &mut EventLog,
        round: Round,
    ) -> bool {
        match board.hazard(self.position) {
            Hazard::Fire if self.action_points >= EXTINGUISH_FIRE_COST => {
                self.extinguish_fire(board, self.position, log, round);
                true
            }
            Hazard::Fire if self.action_points >= EXTINGUISH_SMOKE_COST => {
                // One point left only knocks the fire down to smoke
                board.set_hazard(self.position, Hazard::Smoke);
                self.action_points -= EXTINGUISH_SMOKE_COST;
                self.action_history
                    .push(format!("fire reduced to smoke at {:?}", self.position));
                log.push(
                    round,
                    EventKind::FireReduced {
                        agent: self.id,
                        position: self.position,
                    },
                );
                true
            }
            Hazard::Smoke if self.action_points >= EXTINGUISH_SMOKE_COST => {
                self.extinguish_smoke(board, self.position, log, round);
                true
            }
            Hazard::Clear => true,
            _ => false,
        }
    }

    /// Plan one step toward the cheapest goal and spend points on it:
    /// breaking the wall in the way, opening the door in the way, or moving.
    fn advance_towards(
        &mut self,
        board: &mut MansionBoard,
        goals: &[GridPos],
        noise: &mut Option<&mut ChaCha8Rng>,
        log: &mut EventLog,
        round: Round,
    ) -> StepOutcome {
        if goals.contains(&self.position) {
            return StepOutcome::Arrived;
        }
        let path = plan_route(board, self.position, goals, noise.as_deref_mut());
        let Some(&next) = path.first() else {
            return StepOutcome::Stuck;
        };

        if board.wall_blocked(self.position, next) {
            if self.action_points >= BREAK_WALL_COST {
                self.break_wall(board, next, log, round);
                return StepOutcome::Progressed;
            }
            return StepOutcome::Stuck;
        }
        if board.door_blocked(self.position, next) {
            if self.action_points >= DOOR_TOGGLE_COST {
                self.open_door(board, next, log, round);
                return StepOutcome::Progressed;
            }
            return StepOutcome::Stuck;
        }

        let cost = if self.carrying_victim {
            CARRY_MOVE_COST
        } else {
            MOVE_COST
        };
        if self.action_points < cost {
            return StepOutcome::Stuck;
        }
        self.move_step(next, log, round);
        StepOutcome::Progressed
    }

    fn move_step(&mut self, next: GridPos, log: &mut EventLog, round: Round) {
        let cost = if self.carrying_victim {
            CARRY_MOVE_COST
        } else {
            MOVE_COST
        };
        debug!(agent = self.id.0, from = ?self.position, to = ?next, "move");
        log.push(
            round,
            EventKind::AgentMove {
                agent: self.id,
                from: self.position,
                to: next,
            },
        );
        self.position = next;
        self.move_history.push(next);
        self.action_points -= cost;
    }

    fn extinguish_fire(
        &mut self,
        board: &mut MansionBoard,
        position: GridPos,
        log: &mut EventLog,
        round: Round,
    ) {
        board.set_hazard(position, Hazard::Clear);
        self.action_points -= EXTINGUISH_FIRE_COST;
        self.action_history
            .push(format!("fire extinguished at {position:?}"));
        log.push(
            round,
            EventKind::FireExtinguished {
                agent: self.id,
                position,
            },
        );
    }

    fn extinguish_smoke(
        &mut self,
        board: &mut MansionBoard,
        position: GridPos,
        log: &mut EventLog,
        round: Round,
    ) {
        board.set_hazard(position, Hazard::Clear);
        self.action_points -= EXTINGUISH_SMOKE_COST;
        self.action_history
            .push(format!("smoke extinguished at {position:?}"));
        log.push(
            round,
            EventKind::SmokeExtinguished {
                agent: self.id,
                position,
            },
        );
    }

    /// One swing at the wall between the agent and its next step. An intact
    /// wall takes two swings: the first weakens it, the second opens it.
    fn break_wall(&mut self, board: &mut MansionBoard, next: GridPos, log: &mut EventLog, round: Round) {
        self.action_points -= BREAK_WALL_COST;
        self.action_history
            .push(format!("break wall {:?}-{next:?}", self.position));
        match board.damage_wall(self.position, next) {
            WallDamageOutcome::Weakened => log.push(
                round,
                EventKind::DamageWall {
                    actor: Some(self.id),
                    a: self.position,
                    b: next,
                },
            ),
            WallDamageOutcome::Destroyed => log.push(
                round,
                EventKind::WallDestroyed {
                    actor: Some(self.id),
                    a: self.position,
                    b: next,
                },
            ),
            WallDamageOutcome::AlreadyOpen => {}
        }
    }

    fn open_door(&mut self, board: &mut MansionBoard, next: GridPos, log: &mut EventLog, round: Round) {
        board.open_door(self.position, next);
        self.action_points -= DOOR_TOGGLE_COST;
        self.action_history
            .push(format!("open door {:?}-{next:?}", self.position));
        log.push(
            round,
            EventKind::OpenDoor {
                agent: self.id,
                a: self.position,
                b: next,
            },
        );
    }

    fn deliver_victim(&mut self, board: &mut MansionBoard, log: &mut EventLog, round: Round) {
        self.carrying_victim = false;
        board.record_rescue();
        debug!(agent = self.id.0, total = board.rescued(), "victim delivered");
        self.action_history
            .push(format!("victim delivered at {:?}", self.position));
        log.push(
            round,
            EventKind::RescuedPortrait {
                agent: self.id,
                position: self.position,
                total_rescued: board.rescued(),
            },
        );
    }

    fn examine_portrait(&mut self, board: &mut MansionBoard, log: &mut EventLog, round: Round) {
        let Some(portrait) = board.take_portrait(self.position) else {
            return;
        };
        log.push(
            round,
            EventKind::PortraitFound {
                agent: self.id,
                position: self.position,
                portrait,
            },
        );
        match portrait {
            Portrait::Victim => {
                debug!(agent = self.id.0, position = ?self.position, "victim found");
                self.carrying_victim = true;
                self.action_history
                    .push(format!("victim picked up at {:?}", self.position));
            }
            Portrait::FalseAlarm => {
                debug!(agent = self.id.0, position = ?self.position, "false alarm");
                self.action_history
                    .push(format!("false alarm discarded at {:?}", self.position));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Direction;
    use crate::mansion::config::{BoardConfig, DoorConfig};

    fn open_config() -> BoardConfig {
        BoardConfig {
            width: 10,
            height: 8,
            walls: vec![vec![[false; 4]; 8]; 6],
            false_alarms: vec![GridPos::new(2, 5)],
            victims: vec![GridPos::new(3, 3)],
            fires: vec![],
            doors: vec![],
            entrances: vec![GridPos::new(1, 3)],
        }
    }

    fn board_from(config: &BoardConfig) -> MansionBoard {
        MansionBoard::from_config(config).unwrap()
    }

    #[test]
    fn test_action_points_reset_to_budget_never_banked() {
        let mut board = board_from(&open_config());
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(0), Role::Firefighter, GridPos::new(0, 3));

        // A hazard-free board: the firefighter enters, finds nothing to do,
        // and ends the turn with 3 points left over
        agent.take_turn(&mut board, None, &mut log, 1);
        assert_eq!(agent.action_points(), TURN_ACTION_POINTS);

        agent.action_points = 1;
        agent.take_turn(&mut board, None, &mut log, 2);
        assert_eq!(agent.action_points(), TURN_ACTION_POINTS, "exactly 4, never 5");
    }

    #[test]
    fn test_entry_step_extinguishes_burning_doorway() {
        let mut config = open_config();
        config.fires = vec![GridPos::new(1, 3)];
        let mut board = board_from(&config);
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(0), Role::Rescuer, GridPos::new(0, 3));

        agent.take_turn(&mut board, None, &mut log, 1);

        assert!(agent.has_entered_interior());
        assert_eq!(board.hazard(GridPos::new(1, 3)), Hazard::Clear);
        assert!(agent.move_history().contains(&GridPos::new(1, 3)));
        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::FireExtinguished { .. })));
    }

    #[test]
    fn test_rescuer_full_rescue_over_turns() {
        let mut board = board_from(&open_config());
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(0), Role::Rescuer, GridPos::new(0, 3));

        // Victim 3 cells in at (3,3), entrance at (1,3): reach, pick up,
        // carry back out, deliver
        for round in 1..=4 {
            agent.take_turn(&mut board, None, &mut log, round);
            if board.rescued() == 1 {
                break;
            }
        }

        assert_eq!(board.rescued(), 1);
        assert!(!agent.carrying_victim());
        assert!(board.portrait_at(GridPos::new(3, 3)).is_none());
        let rescues = log
            .events()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::RescuedPortrait { .. }))
            .count();
        assert_eq!(rescues, 1, "rescued increments exactly once");
    }

    #[test]
    fn test_rescuer_discards_false_alarm_and_keeps_searching() {
        let mut config = open_config();
        config.false_alarms = vec![GridPos::new(2, 3)];
        config.victims = vec![GridPos::new(6, 3)];
        let mut board = board_from(&config);
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(0), Role::Rescuer, GridPos::new(0, 3));

        // The false alarm is nearer; it gets examined and discarded first
        agent.take_turn(&mut board, None, &mut log, 1);

        assert!(board.portrait_at(GridPos::new(2, 3)).is_none());
        assert!(!agent.carrying_victim());
        assert!(log.events().iter().any(|e| matches!(
            e.kind,
            EventKind::PortraitFound {
                portrait: Portrait::FalseAlarm,
                ..
            }
        )));
        // Still heading for the real victim afterwards
        assert!(agent.position().x > 2);
    }

    #[test]
    fn test_firefighter_extinguishes_adjacent_fire() {
        let mut config = open_config();
        config.fires = vec![GridPos::new(2, 3)];
        let mut board = board_from(&config);
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(1), Role::Firefighter, GridPos::new(0, 3));

        agent.take_turn(&mut board, None, &mut log, 1);

        assert_eq!(board.hazard(GridPos::new(2, 3)), Hazard::Clear);
        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::FireExtinguished { .. })));
    }

    #[test]
    fn test_firefighter_with_one_point_reduces_fire_to_smoke() {
        let mut config = open_config();
        config.fires = vec![GridPos::new(4, 3)];
        let mut board = board_from(&config);
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(1), Role::Firefighter, GridPos::new(0, 3));
        agent.position = GridPos::new(4, 3);
        agent.has_entered_interior = true;
        agent.action_points = 1;

        agent.take_turn(&mut board, None, &mut log, 1);

        assert_eq!(board.hazard(GridPos::new(4, 3)), Hazard::Smoke);
        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::FireReduced { .. })));
    }

    #[test]
    fn test_firefighter_breaks_through_wall_in_two_swings() {
        let mut config = open_config();
        // A full wall line between x=4 and x=5: breaking through (2 swings,
        // 4 AP) beats the seven-step corridor detour
        for y in 1..=6 {
            config.walls[(y - 1) as usize][3][Direction::East.index()] = true;
            config.walls[(y - 1) as usize][4][Direction::West.index()] = true;
        }
        config.fires = vec![GridPos::new(5, 3)];
        let mut board = board_from(&config);
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(1), Role::Firefighter, GridPos::new(0, 3));
        agent.position = GridPos::new(4, 3);
        agent.has_entered_interior = true;

        agent.take_turn(&mut board, None, &mut log, 1);
        assert_eq!(board.damage_counter(), 2);
        assert!(!board.wall_blocked(GridPos::new(4, 3), GridPos::new(5, 3)));

        agent.take_turn(&mut board, None, &mut log, 2);
        assert_eq!(board.hazard(GridPos::new(5, 3)), Hazard::Clear);

        let kinds: Vec<_> = log.events().iter().map(|e| &e.kind).collect();
        assert!(kinds
            .iter()
            .any(|k| matches!(k, EventKind::DamageWall { actor: Some(_), .. })));
        assert!(kinds
            .iter()
            .any(|k| matches!(k, EventKind::WallDestroyed { actor: Some(_), .. })));
    }

    #[test]
    fn test_firefighter_opens_closed_door_on_the_way() {
        let mut config = open_config();
        for y in 1..=6 {
            config.walls[(y - 1) as usize][3][Direction::East.index()] = true;
            config.walls[(y - 1) as usize][4][Direction::West.index()] = true;
        }
        config.doors.push(DoorConfig {
            a: GridPos::new(4, 3),
            b: GridPos::new(5, 3),
            open: false,
        });
        config.fires = vec![GridPos::new(5, 3)];
        let mut board = board_from(&config);
        let mut log = EventLog::new();
        let mut agent = Agent::new(AgentId(1), Role::Firefighter, GridPos::new(0, 3));
        agent.position = GridPos::new(4, 3);
        agent.has_entered_interior = true;

        agent.take_turn(&mut board, None, &mut log, 1);

        assert!(!board.door_blocked(GridPos::new(4, 3), GridPos::new(5, 3)));
        assert_eq!(board.hazard(GridPos::new(5, 3)), Hazard::Clear);
        assert_eq!(board.damage_counter(), 0, "doors are opened, not broken");
        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::OpenDoor { .. })));
    }

    #[test]
    fn test_reset_to_staging_strips_progress() {
        let mut agent = Agent::new(AgentId(2), Role::Rescuer, GridPos::new(0, 3));
        agent.position = GridPos::new(4, 4);
        agent.has_entered_interior = true;
        agent.carrying_victim = true;

        agent.reset_to_staging();

        assert_eq!(agent.position(), GridPos::new(0, 3));
        assert!(!agent.carrying_victim());
        assert!(!agent.has_entered_interior());
    }
}
