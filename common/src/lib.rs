//! Types shared between the minesweeper board engine and the game host.
//!
//! `models` holds the plain value types (positions, parameters, the render
//! categories of a cell) and `protocol` the JSON messages exchanged with a
//! renderer over the WebSocket connection.

pub mod models;
pub mod protocol;
