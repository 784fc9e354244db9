//! Board configuration input and fail-fast validation
//!
//! The engine performs no file or network I/O: layout parsing lives in an
//! external collaborator and hands the core this plain structured value.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Direction, GridPos};

/// A door connecting two adjacent interior cells
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DoorConfig {
    pub a: GridPos,
    pub b: GridPos,
    pub open: bool,
}

/// Initial board description, validated before any cell is built.
///
/// The wall matrix is row-major over the playable interior: row 0 maps to
/// `y = 1`, column 0 to `x = 1`, and each cell carries 4 present-bits in
/// north/west/south/east order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
    pub walls: Vec<Vec<[bool; 4]>>,
    pub false_alarms: Vec<GridPos>,
    pub victims: Vec<GridPos>,
    pub fires: Vec<GridPos>,
    pub doors: Vec<DoorConfig>,
    pub entrances: Vec<GridPos>,
}

impl BoardConfig {
    pub fn interior_width(&self) -> i32 {
        self.width - 2
    }

    pub fn interior_height(&self) -> i32 {
        self.height - 2
    }

    fn interior_contains(&self, pos: GridPos) -> bool {
        pos.x >= 1 && pos.x <= self.width - 2 && pos.y >= 1 && pos.y <= self.height - 2
    }

    fn wall_bit(&self, pos: GridPos, dir: Direction) -> bool {
        self.walls[(pos.y - 1) as usize][(pos.x - 1) as usize][dir.index()]
    }

    /// Reject malformed input before construction; nothing is clamped or
    /// silently dropped.
    pub fn validate(&self) -> Result<()> {
        if self.width < 3 || self.height < 3 {
            return Err(SimError::DegenerateBoard {
                width: self.width,
                height: self.height,
            });
        }

        let expected_rows = self.interior_height() as usize;
        if self.walls.len() != expected_rows {
            return Err(SimError::WallMatrixRows {
                rows: self.walls.len(),
                expected: expected_rows,
            });
        }
        let expected_cols = self.interior_width() as usize;
        for (row, cells) in self.walls.iter().enumerate() {
            if cells.len() != expected_cols {
                return Err(SimError::WallMatrixCols {
                    row,
                    cols: cells.len(),
                    expected: expected_cols,
                });
            }
        }

        // Shared boundaries must agree on both sides (spec: mirrored walls)
        for y in 1..=self.height - 2 {
            for x in 1..=self.width - 2 {
                let pos = GridPos::new(x, y);
                for dir in [Direction::South, Direction::East] {
                    let neighbor = pos.step(dir);
                    if self.interior_contains(neighbor)
                        && self.wall_bit(pos, dir) != self.wall_bit(neighbor, dir.opposite())
                    {
                        return Err(SimError::WallMirrorMismatch { a: pos, b: neighbor });
                    }
                }
            }
        }

        check_count("false alarm", self.false_alarms.len(), 1, 3)?;
        check_count("victim", self.victims.len(), 1, 3)?;
        check_count("fire", self.fires.len(), 0, 10)?;
        check_count("door", self.doors.len(), 0, 8)?;
        check_count("entrance", self.entrances.len(), 1, 4)?;

        for (kind, coords) in [
            ("false alarm", &self.false_alarms),
            ("victim", &self.victims),
            ("fire", &self.fires),
        ] {
            for &pos in coords {
                if !self.interior_contains(pos) {
                    return Err(SimError::CoordOutsideInterior { kind, pos });
                }
            }
        }

        let mut seen_doors = Vec::new();
        for door in &self.doors {
            for (kind, pos) in [("door", door.a), ("door", door.b)] {
                if !self.interior_contains(pos) {
                    return Err(SimError::CoordOutsideInterior { kind, pos });
                }
            }
            if door.a.direction_to(&door.b).is_none() {
                return Err(SimError::DoorNotAdjacent {
                    a: door.a,
                    b: door.b,
                });
            }
            let key = if door.a <= door.b {
                (door.a, door.b)
            } else {
                (door.b, door.a)
            };
            if seen_doors.contains(&key) {
                return Err(SimError::DuplicateDoor {
                    a: door.a,
                    b: door.b,
                });
            }
            seen_doors.push(key);
        }

        for &pos in &self.entrances {
            if !self.interior_contains(pos) {
                return Err(SimError::CoordOutsideInterior {
                    kind: "entrance",
                    pos,
                });
            }
            // Corner rim cells have no unambiguous staging side
            let on_edges = usize::from(pos.x == 1)
                + usize::from(pos.x == self.width - 2)
                + usize::from(pos.y == 1)
                + usize::from(pos.y == self.height - 2);
            if on_edges != 1 {
                return Err(SimError::EntranceNotOnRim(pos));
            }
        }

        Ok(())
    }

    /// The mansion board the engine was originally tuned on: a 10x8 grid
    /// (8x6 playable), five rooms, five doors, four entrances, and a fire
    /// cluster around the great hall.
    pub fn reference_layout() -> Self {
        let width = 10;
        let height = 8;
        let mut walls = vec![vec![[false; 4]; 8]; 6];

        // Outer shell of the playable area
        for x in 1..=8 {
            set_wall(&mut walls, GridPos::new(x, 1), Direction::North);
            set_wall(&mut walls, GridPos::new(x, 6), Direction::South);
        }
        for y in 1..=6 {
            set_wall(&mut walls, GridPos::new(1, y), Direction::West);
            set_wall(&mut walls, GridPos::new(8, y), Direction::East);
        }

        // Room dividers
        for y in 1..=2 {
            set_wall(&mut walls, GridPos::new(3, y), Direction::East);
        }
        for y in 1..=3 {
            set_wall(&mut walls, GridPos::new(5, y), Direction::East);
        }
        for x in 1..=3 {
            set_wall(&mut walls, GridPos::new(x, 2), Direction::South);
        }
        for x in 4..=8 {
            set_wall(&mut walls, GridPos::new(x, 4), Direction::South);
        }
        for y in 4..=6 {
            set_wall(&mut walls, GridPos::new(2, y), Direction::East);
        }

        let entrances = vec![
            GridPos::new(1, 3),
            GridPos::new(8, 4),
            GridPos::new(4, 1),
            GridPos::new(6, 6),
        ];
        // Entrance doorways stay open in the outer shell
        clear_wall(&mut walls, GridPos::new(1, 3), Direction::West);
        clear_wall(&mut walls, GridPos::new(8, 4), Direction::East);
        clear_wall(&mut walls, GridPos::new(4, 1), Direction::North);
        clear_wall(&mut walls, GridPos::new(6, 6), Direction::South);

        let doors = vec![
            DoorConfig {
                a: GridPos::new(3, 2),
                b: GridPos::new(4, 2),
                open: false,
            },
            DoorConfig {
                a: GridPos::new(5, 1),
                b: GridPos::new(6, 1),
                open: true,
            },
            DoorConfig {
                a: GridPos::new(2, 2),
                b: GridPos::new(2, 3),
                open: false,
            },
            DoorConfig {
                a: GridPos::new(6, 4),
                b: GridPos::new(6, 5),
                open: false,
            },
            DoorConfig {
                a: GridPos::new(2, 5),
                b: GridPos::new(3, 5),
                open: true,
            },
        ];

        Self {
            width,
            height,
            walls,
            false_alarms: vec![GridPos::new(8, 6)],
            victims: vec![GridPos::new(6, 2), GridPos::new(3, 5)],
            fires: vec![
                GridPos::new(4, 3),
                GridPos::new(5, 3),
                GridPos::new(3, 3),
                GridPos::new(4, 4),
                GridPos::new(5, 4),
                GridPos::new(6, 3),
            ],
            doors,
            entrances,
        }
    }
}

fn check_count(kind: &'static str, got: usize, min: usize, max: usize) -> Result<()> {
    if got < min || got > max {
        return Err(SimError::BadMarkerCount {
            kind,
            got,
            min,
            max,
        });
    }
    Ok(())
}

/// Mark the boundary on `dir` of `pos`, mirroring onto the far side when that
/// side is also playable.
fn set_wall(walls: &mut [Vec<[bool; 4]>], pos: GridPos, dir: Direction) {
    walls[(pos.y - 1) as usize][(pos.x - 1) as usize][dir.index()] = true;
    let far = pos.step(dir);
    if far.x >= 1 && far.y >= 1 {
        if let Some(row) = walls.get_mut((far.y - 1) as usize) {
            if let Some(cell) = row.get_mut((far.x - 1) as usize) {
                cell[dir.opposite().index()] = true;
            }
        }
    }
}

fn clear_wall(walls: &mut [Vec<[bool; 4]>], pos: GridPos, dir: Direction) {
    walls[(pos.y - 1) as usize][(pos.x - 1) as usize][dir.index()] = false;
}
