//! Minesweeper board engine.
//!
//! A [`Board`] owns every [`Cell`] of the grid in a flat arena. Neighbor
//! links are arena indices computed once at construction, together with each
//! cell's adjacent mine count. After that the board only changes through
//! [`Board::click`] (or the lower level [`Board::reveal`]), which uncover and
//! flag cells and move the game between [`GameStatus`] states.
//!
//! ```
//! use minesweeper_engine::{Board, ClickAction, GameStatus, Pos};
//!
//! let mut board = Board::from_mines(3, 3, [Pos::new(2, 2)]).unwrap();
//! let status = board.click(Pos::new(0, 0), ClickAction::Reveal).unwrap();
//! assert_eq!(status, GameStatus::Won);
//! ```

mod board;
mod cell;
mod error;
pub mod input;

pub use board::Board;
pub use cell::Cell;
pub use error::BoardError;

pub use minesweeper_common::models::{CellView, ClickAction, GameStatus, MouseButton, Pos};
