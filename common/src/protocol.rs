use serde::{Deserialize, Serialize};

use crate::models::{CellView, GameParams, GameStatus, MouseButton, Pos};

/// Messages sent by the renderer. Click coordinates are canvas pixels.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "click")]
    Click { x: i32, y: i32, button: MouseButton },
    #[serde(rename = "restart")]
    Restart { params: GameParams },
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct CellUpdate {
    pub pos: Pos,
    pub value: CellView,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        columns: usize,
        rows: usize,
        mines: usize,
        cell_size: u32,
        field: Vec<Vec<CellView>>,
    },
    #[serde(rename = "update")]
    Update {
        updates: Vec<CellUpdate>,
        status: GameStatus,
        banner: Option<String>,
    },
}
