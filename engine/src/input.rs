//! Translation of renderer input into board coordinates.

use minesweeper_common::models::Pos;

/// Maps a pixel on the canvas to the cell drawn under it.
///
/// Returns `None` for negative pixels or a zero cell size. The result is not
/// checked against any board; [`crate::Board::click`] rejects positions
/// outside the grid.
pub fn grid_position(x: i32, y: i32, cell_size: u32) -> Option<Pos> {
    if cell_size == 0 {
        return None;
    }
    let column = u32::try_from(x).ok()? / cell_size;
    let row = u32::try_from(y).ok()? / cell_size;
    Some(Pos::new(column as usize, row as usize))
}
