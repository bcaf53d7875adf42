use serde::{Deserialize, Serialize};

/// What a renderer should draw for a single cell.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum CellView {
    #[serde(rename = "covered")]
    Covered,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "numbered")]
    Numbered { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameParams {
    pub columns: usize,
    pub rows: usize,
    pub mines: usize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 8,
            mines: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum GameStatus {
    #[default]
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "won")]
    Won,
    #[serde(rename = "lost")]
    Lost,
}

impl GameStatus {
    pub fn is_finished(self) -> bool {
        self != GameStatus::Playing
    }

    /// Text for the end-of-game overlay.
    pub fn banner(self) -> Option<&'static str> {
        match self {
            GameStatus::Playing => None,
            GameStatus::Won => Some("You Won!"),
            GameStatus::Lost => Some("YOU LOST!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Reveal,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum MouseButton {
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "middle")]
    Middle,
    #[serde(rename = "right")]
    Right,
}

impl MouseButton {
    pub fn action(self) -> Option<ClickAction> {
        match self {
            MouseButton::Left => Some(ClickAction::Reveal),
            MouseButton::Right => Some(ClickAction::Flag),
            MouseButton::Middle => None,
        }
    }
}

/// Body of `POST /create`. Fields left out are taken from the host's
/// configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mines: Option<usize>,
}

impl CreateRequest {
    pub fn resolve(self, defaults: GameParams) -> GameParams {
        GameParams {
            columns: self.columns.unwrap_or(defaults.columns),
            rows: self.rows.unwrap_or(defaults.rows),
            mines: self.mines.unwrap_or(defaults.mines),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateResponse {
    pub id: String,
}
