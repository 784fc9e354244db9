//! The mansion structural grid: walls, doors, hazards, portraits, counters
//!
//! The board is the one shared mutable resource of the simulation. All
//! structural mutation goes through the methods here so the mirrored-wall
//! invariant holds after every operation: both cells sharing a boundary
//! always agree on that segment's state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Direction, GridPos};
use crate::mansion::cell::{Cell, DoorState, Hazard, Portrait, WallSegment};
use crate::mansion::config::BoardConfig;

/// What a single wall hit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallDamageOutcome {
    /// Intact segment absorbed the hit; it still blocks
    Weakened,
    /// Weakened segment gave way; the boundary is now permeable
    Destroyed,
    /// No segment left to hit; nothing happened
    AlreadyOpen,
}

/// Door registry key: the unordered pair, stored in sorted order
fn door_key(a: GridPos, b: GridPos) -> (GridPos, GridPos) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The full mansion grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MansionBoard {
    width: i32,
    height: i32,
    cells: HashMap<GridPos, Cell>,
    doors: HashMap<(GridPos, GridPos), DoorState>,
    entrances: Vec<GridPos>,
    damage_counter: u32,
    rescued: u32,
    casualties: u32,
}

impl MansionBoard {
    /// Build the board from a validated configuration
    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        config.validate()?;

        let mut cells = HashMap::new();
        for y in 0..config.height {
            for x in 0..config.width {
                cells.insert(GridPos::new(x, y), Cell::default());
            }
        }

        let mut board = Self {
            width: config.width,
            height: config.height,
            cells,
            doors: HashMap::new(),
            entrances: config.entrances.clone(),
            damage_counter: 0,
            rescued: 0,
            casualties: 0,
        };

        for (row, row_cells) in config.walls.iter().enumerate() {
            for (col, bits) in row_cells.iter().enumerate() {
                let pos = GridPos::new(col as i32 + 1, row as i32 + 1);
                if let Some(cell) = board.cells.get_mut(&pos) {
                    for dir in Direction::ALL {
                        cell.walls[dir.index()].present = bits[dir.index()];
                    }
                }
            }
        }

        for door in &config.doors {
            let state = if door.open {
                DoorState::Open
            } else {
                DoorState::Closed
            };
            board.doors.insert(door_key(door.a, door.b), state);
        }

        for &pos in &config.fires {
            board.set_hazard(pos, Hazard::Fire);
        }
        for &pos in &config.victims {
            board.set_portrait(pos, Portrait::Victim);
        }
        for &pos in &config.false_alarms {
            board.set_portrait(pos, Portrait::FalseAlarm);
        }

        Ok(board)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Is the cell inside the central playable area? Border cells are
    /// movement-only corridors.
    pub fn interior_contains(&self, pos: GridPos) -> bool {
        pos.x >= 1 && pos.x <= self.width - 2 && pos.y >= 1 && pos.y <= self.height - 2
    }

    /// Playable cells in row-major order (deterministic for seeded draws)
    pub fn interior_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        let (width, height) = (self.width, self.height);
        (1..height - 1).flat_map(move |y| (1..width - 1).map(move |x| GridPos::new(x, y)))
    }

    /// In-bounds 4-neighbors of a cell
    pub fn neighbors(&self, pos: GridPos) -> Vec<GridPos> {
        pos.neighbors()
            .into_iter()
            .filter(|n| self.in_bounds(*n))
            .collect()
    }

    /// Interior rim cells that double as spawn points and extraction points
    pub fn entrances(&self) -> &[GridPos] {
        &self.entrances
    }

    /// The exterior corridor cell just outside an entrance, where agents
    /// stage before entering and are sent back when caught by fire.
    pub fn staging_cell(&self, entrance: GridPos) -> GridPos {
        if entrance.y == 1 {
            GridPos::new(entrance.x, 0)
        } else if entrance.x == 1 {
            GridPos::new(0, entrance.y)
        } else if entrance.x == self.width - 2 {
            GridPos::new(self.width - 1, entrance.y)
        } else {
            GridPos::new(entrance.x, self.height - 1)
        }
    }

    /// One forced step inward from a border corridor cell; `None` when the
    /// cell is not on the border.
    pub fn inward_step(&self, pos: GridPos) -> Option<GridPos> {
        if pos.x == 0 {
            Some(GridPos::new(1, pos.y))
        } else if pos.y == 0 {
            Some(GridPos::new(pos.x, 1))
        } else if pos.x == self.width - 1 {
            Some(GridPos::new(self.width - 2, pos.y))
        } else if pos.y == self.height - 1 {
            Some(GridPos::new(pos.x, self.height - 2))
        } else {
            None
        }
    }

    // ===== Walls and doors =====

    /// Is the pair registered as a door (in either order)?
    pub fn is_door(&self, a: GridPos, b: GridPos) -> bool {
        self.doors.contains_key(&door_key(a, b))
    }

    pub fn door_state(&self, a: GridPos, b: GridPos) -> Option<DoorState> {
        self.doors.get(&door_key(a, b)).copied()
    }

    /// The wall segment between two adjacent cells, read from whichever side
    /// stores it (border cells carry no wall data).
    fn segment(&self, a: GridPos, b: GridPos, dir: Direction) -> WallSegment {
        if self.interior_contains(a) {
            self.cells
                .get(&a)
                .map(|c| c.walls[dir.index()])
                .unwrap_or_default()
        } else if self.interior_contains(b) {
            self.cells
                .get(&b)
                .map(|c| c.walls[dir.opposite().index()])
                .unwrap_or_default()
        } else {
            WallSegment::default()
        }
    }

    /// Apply a mutation to both mirrored sides of a boundary
    fn update_segment(&mut self, a: GridPos, b: GridPos, dir: Direction, f: impl Fn(&mut WallSegment)) {
        if self.interior_contains(a) {
            if let Some(cell) = self.cells.get_mut(&a) {
                f(&mut cell.walls[dir.index()]);
            }
        }
        if self.interior_contains(b) {
            if let Some(cell) = self.cells.get_mut(&b) {
                f(&mut cell.walls[dir.opposite().index()]);
            }
        }
    }

    /// True iff the cells are adjacent and an intact wall blocks the
    /// boundary. A registered door overrides the wall: passage through a
    /// door pair is governed by [`door_blocked`](Self::door_blocked) alone.
    pub fn wall_blocked(&self, a: GridPos, b: GridPos) -> bool {
        let Some(dir) = a.direction_to(&b) else {
            return false;
        };
        if self.is_door(a, b) {
            return false;
        }
        self.segment(a, b, dir).present
    }

    /// True iff the pair is a registered door that is not open
    pub fn door_blocked(&self, a: GridPos, b: GridPos) -> bool {
        matches!(self.door_state(a, b), Some(DoorState::Closed))
    }

    /// The movement check: blocked by either an intact wall or a closed door
    pub fn passage_blocked(&self, a: GridPos, b: GridPos) -> bool {
        self.wall_blocked(a, b) || self.door_blocked(a, b)
    }

    /// Apply one hit to the wall segment between two adjacent cells.
    ///
    /// An intact segment is weakened, a weakened one destroyed; either way
    /// the global damage counter advances by one. Hitting an absent segment
    /// is a no-op. Both mirrored sides are updated identically.
    ///
    /// # Panics
    ///
    /// Panics on a non-adjacent pair: that is a logic bug in the caller, not
    /// a game state.
    pub fn damage_wall(&mut self, a: GridPos, b: GridPos) -> WallDamageOutcome {
        let Some(dir) = a.direction_to(&b) else {
            panic!("wall mutation on non-adjacent pair {a:?}/{b:?}");
        };
        let seg = self.segment(a, b, dir);
        if !seg.present {
            return WallDamageOutcome::AlreadyOpen;
        }
        if seg.damaged {
            self.update_segment(a, b, dir, |w| w.present = false);
            self.damage_counter += 1;
            WallDamageOutcome::Destroyed
        } else {
            self.update_segment(a, b, dir, |w| w.damaged = true);
            self.damage_counter += 1;
            WallDamageOutcome::Weakened
        }
    }

    /// Open the door between two cells (both sides at once).
    ///
    /// # Panics
    ///
    /// Panics when the pair is not a registered door.
    pub fn open_door(&mut self, a: GridPos, b: GridPos) {
        let Some(state) = self.doors.get_mut(&door_key(a, b)) else {
            panic!("door operation on non-door pair {a:?}/{b:?}");
        };
        *state = DoorState::Open;
    }

    /// Close the door between two cells (both sides at once).
    ///
    /// # Panics
    ///
    /// Panics when the pair is not a registered door.
    pub fn close_door(&mut self, a: GridPos, b: GridPos) {
        let Some(state) = self.doors.get_mut(&door_key(a, b)) else {
            panic!("door operation on non-door pair {a:?}/{b:?}");
        };
        *state = DoorState::Closed;
    }

    /// Fire destroys a door: the pair is unregistered, the boundary it
    /// guarded is opened for good, and the structure takes one damage.
    ///
    /// # Panics
    ///
    /// Panics when the pair is not a registered door or not adjacent.
    pub fn destroy_door(&mut self, a: GridPos, b: GridPos) {
        let Some(dir) = a.direction_to(&b) else {
            panic!("wall mutation on non-adjacent pair {a:?}/{b:?}");
        };
        if self.doors.remove(&door_key(a, b)).is_none() {
            panic!("door operation on non-door pair {a:?}/{b:?}");
        }
        self.update_segment(a, b, dir, |w| {
            w.present = false;
            w.damaged = true;
        });
        self.damage_counter += 1;
    }

    // ===== Hazards and portraits =====

    pub fn hazard(&self, pos: GridPos) -> Hazard {
        self.cells.get(&pos).map(|c| c.hazard).unwrap_or_default()
    }

    pub fn set_hazard(&mut self, pos: GridPos, hazard: Hazard) {
        debug_assert!(
            hazard == Hazard::Clear || self.interior_contains(pos),
            "hazard placed on corridor cell {pos:?}"
        );
        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.hazard = hazard;
        }
    }

    pub fn portrait_at(&self, pos: GridPos) -> Option<Portrait> {
        self.cells.get(&pos).and_then(|c| c.portrait)
    }

    pub fn set_portrait(&mut self, pos: GridPos, portrait: Portrait) {
        debug_assert!(
            self.interior_contains(pos),
            "portrait placed on corridor cell {pos:?}"
        );
        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.portrait = Some(portrait);
        }
    }

    /// Remove and return the portrait at a cell
    pub fn take_portrait(&mut self, pos: GridPos) -> Option<Portrait> {
        self.cells.get_mut(&pos).and_then(|c| c.portrait.take())
    }

    /// Cells still holding an unexamined portrait, row-major
    pub fn portrait_cells(&self) -> Vec<GridPos> {
        self.interior_cells()
            .filter(|pos| self.portrait_at(*pos).is_some())
            .collect()
    }

    /// Cells with standing smoke or fire, row-major
    pub fn hazard_cells(&self) -> Vec<GridPos> {
        self.interior_cells()
            .filter(|pos| self.hazard(*pos) != Hazard::Clear)
            .collect()
    }

    /// Wall-segment snapshot for rendering
    pub fn walls_at(&self, pos: GridPos) -> [WallSegment; 4] {
        self.cells.get(&pos).map(|c| c.walls).unwrap_or_default()
    }

    // ===== Counters =====

    pub fn damage_counter(&self) -> u32 {
        self.damage_counter
    }

    pub fn rescued(&self) -> u32 {
        self.rescued
    }

    pub fn casualties(&self) -> u32 {
        self.casualties
    }

    pub fn record_rescue(&mut self) {
        self.rescued += 1;
    }

    pub fn record_casualty(&mut self) {
        self.casualties += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> MansionBoard {
        MansionBoard::from_config(&BoardConfig::reference_layout()).unwrap()
    }

    #[test]
    fn test_initial_markers_placed() {
        let board = board();
        assert_eq!(board.hazard(GridPos::new(4, 3)), Hazard::Fire);
        assert_eq!(board.hazard(GridPos::new(2, 2)), Hazard::Clear);
        assert_eq!(board.portrait_at(GridPos::new(6, 2)), Some(Portrait::Victim));
        assert_eq!(
            board.portrait_at(GridPos::new(8, 6)),
            Some(Portrait::FalseAlarm)
        );
        assert_eq!(board.damage_counter(), 0);
    }

    #[test]
    fn test_wall_blocked_is_symmetric() {
        let board = board();
        let a = GridPos::new(3, 1);
        let b = GridPos::new(4, 1);
        assert!(board.wall_blocked(a, b));
        assert!(board.wall_blocked(b, a));

        let open_a = GridPos::new(1, 3);
        let open_b = GridPos::new(2, 3);
        assert!(!board.wall_blocked(open_a, open_b));
    }

    #[test]
    fn test_door_overrides_wall() {
        let mut board = board();
        let a = GridPos::new(3, 2);
        let b = GridPos::new(4, 2);
        // Closed door: the wall segment under it never blocks, the door does
        assert!(!board.wall_blocked(a, b));
        assert!(board.door_blocked(a, b));
        assert!(board.passage_blocked(a, b));

        board.open_door(a, b);
        assert!(!board.passage_blocked(a, b));
        board.close_door(b, a); // either order addresses the same door
        assert!(board.door_blocked(a, b));
    }

    #[test]
    fn test_wall_damage_two_stage_then_noop() {
        let mut board = board();
        let a = GridPos::new(3, 1);
        let b = GridPos::new(4, 1);

        assert_eq!(board.damage_wall(a, b), WallDamageOutcome::Weakened);
        assert!(board.wall_blocked(a, b), "weakened wall still blocks");
        assert_eq!(board.damage_counter(), 1);

        // Mirrored on the far side: hitting from the other cell destroys it
        assert_eq!(board.damage_wall(b, a), WallDamageOutcome::Destroyed);
        assert!(!board.wall_blocked(a, b));
        assert_eq!(board.damage_counter(), 2);

        assert_eq!(board.damage_wall(a, b), WallDamageOutcome::AlreadyOpen);
        assert_eq!(board.damage_counter(), 2, "no double counting");
    }

    #[test]
    fn test_destroy_door_opens_boundary_and_counts_damage() {
        let mut board = board();
        let a = GridPos::new(3, 2);
        let b = GridPos::new(4, 2);
        board.destroy_door(a, b);
        assert!(!board.is_door(a, b));
        assert!(!board.passage_blocked(a, b));
        assert_eq!(board.damage_counter(), 1);
    }

    #[test]
    #[should_panic(expected = "non-adjacent pair")]
    fn test_damage_wall_panics_on_non_adjacent() {
        let mut board = board();
        board.damage_wall(GridPos::new(1, 1), GridPos::new(3, 1));
    }

    #[test]
    #[should_panic(expected = "non-door pair")]
    fn test_open_door_panics_on_non_door() {
        let mut board = board();
        board.open_door(GridPos::new(1, 1), GridPos::new(2, 1));
    }

    #[test]
    fn test_staging_and_inward_step_round_trip() {
        let board = board();
        for &entrance in board.entrances() {
            let staging = board.staging_cell(entrance);
            assert!(!board.interior_contains(staging));
            assert_eq!(board.inward_step(staging), Some(entrance));
        }
        assert_eq!(board.inward_step(GridPos::new(4, 4)), None);
    }

    #[test]
    fn test_take_portrait_empties_cell() {
        let mut board = board();
        let pos = GridPos::new(6, 2);
        assert_eq!(board.take_portrait(pos), Some(Portrait::Victim));
        assert_eq!(board.take_portrait(pos), None);
        assert!(!board.portrait_cells().contains(&pos));
    }

    #[test]
    fn test_interior_cells_cover_playable_area() {
        let board = board();
        let cells: Vec<_> = board.interior_cells().collect();
        assert_eq!(cells.len(), 48);
        assert!(cells.iter().all(|pos| board.interior_contains(*pos)));
        assert!(!board.interior_contains(GridPos::new(0, 3)));
        assert!(!board.interior_contains(GridPos::new(9, 3)));
    }
}
