use thiserror::Error;

use crate::core::types::GridPos;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("board dimensions {width}x{height} leave no playable interior")]
    DegenerateBoard { width: i32, height: i32 },

    #[error("wall matrix has {rows} rows, expected {expected}")]
    WallMatrixRows { rows: usize, expected: usize },

    #[error("wall matrix row {row} has {cols} cells, expected {expected}")]
    WallMatrixCols {
        row: usize,
        cols: usize,
        expected: usize,
    },

    #[error("wall matrix disagrees across the {a:?}/{b:?} boundary")]
    WallMirrorMismatch { a: GridPos, b: GridPos },

    #[error("{kind} coordinate {pos:?} is outside the playable interior")]
    CoordOutsideInterior { kind: &'static str, pos: GridPos },

    #[error("{kind} count {got} outside allowed range {min}..={max}")]
    BadMarkerCount {
        kind: &'static str,
        got: usize,
        min: usize,
        max: usize,
    },

    #[error("entrance {0:?} is not on a single edge of the interior rim")]
    EntranceNotOnRim(GridPos),

    #[error("door between {a:?} and {b:?} connects non-adjacent cells")]
    DoorNotAdjacent { a: GridPos, b: GridPos },

    #[error("duplicate door between {a:?} and {b:?}")]
    DuplicateDoor { a: GridPos, b: GridPos },
}

pub type Result<T> = std::result::Result<T, SimError>;
