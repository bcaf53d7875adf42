use std::fmt;

use minesweeper_common::models::Pos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The grid cannot hold the requested mines, or has no cells at all.
    InvalidConfiguration {
        columns: usize,
        rows: usize,
        mines: usize,
    },
    /// A position outside `[0, columns) x [0, rows)`.
    OutOfBounds {
        pos: Pos,
        columns: usize,
        rows: usize,
    },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidConfiguration {
                columns,
                rows,
                mines,
            } => write!(
                f,
                "invalid board configuration: {} mines on a {}x{} grid",
                mines, columns, rows
            ),
            BoardError::OutOfBounds { pos, columns, rows } => write!(
                f,
                "position ({}, {}) is outside the {}x{} grid",
                pos.x, pos.y, columns, rows
            ),
        }
    }
}

impl std::error::Error for BoardError {}
