use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};
use nanoid::nanoid;
use rocket::futures::{SinkExt, stream::SplitSink};
use rocket_ws::{Message, stream::DuplexStream};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use minesweeper_common::{
    models::{CellView, GameParams, GameStatus, MouseButton},
    protocol::{CellUpdate, ClientMessage, ServerMessage},
};
use minesweeper_engine::{Board, BoardError, Pos, input::grid_position};

pub type Games = Arc<DashMap<String, Arc<Mutex<Game>>>>;

type Sink = SplitSink<DuplexStream, Message>;

const GAME_ID_LENGTH: usize = 5;
const ID_ATTEMPTS_PER_LENGTH: usize = 10;

/// Stores `game` under a fresh nanoid. Every
/// `ID_ATTEMPTS_PER_LENGTH` collisions the id grows by one character.
#[instrument(level = "trace", skip(games, game))]
pub fn insert_game(games: &Games, game: Game) -> String {
    let game = Arc::new(Mutex::new(game));
    let mut collisions = 0;
    loop {
        let id = nanoid!((GAME_ID_LENGTH + collisions / ID_ATTEMPTS_PER_LENGTH));
        if let Entry::Vacant(slot) = games.entry(id.clone()) {
            slot.insert(game);
            info!("Stored game {} ({} id collisions)", id, collisions);
            return id;
        }
        debug!("Game id {} already taken", id);
        collisions += 1;
    }
}

struct Connection {
    id: Uuid,
    sink: Sink,
}

/// One hosted game: a board plus at most one connected player.
pub struct Game {
    board: Board,
    cell_size: u32,
    connection: Option<Connection>,
    last_activity: Instant,
}

fn generate_board(params: &GameParams) -> Result<Board, BoardError> {
    Board::generate(params.columns, params.rows, params.mines, &mut rand::rng())
}

fn changed_cells(before: &[Vec<CellView>], after: &[Vec<CellView>]) -> Vec<CellUpdate> {
    let mut updates = Vec::new();
    for (y, (old_row, new_row)) in before.iter().zip(after).enumerate() {
        for (x, (old, new)) in old_row.iter().zip(new_row).enumerate() {
            if old != new {
                updates.push(CellUpdate {
                    pos: Pos::new(x, y),
                    value: *new,
                });
            }
        }
    }
    updates
}

async fn send(sink: &mut Sink, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(text) => {
            if let Err(e) = sink.send(Message::Text(text)).await {
                warn!("Failed to send message: {}", e);
            }
        }
        Err(e) => warn!("Failed to serialize message: {}", e),
    }
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new(params: GameParams, cell_size: u32) -> Result<Self, BoardError> {
        info!(
            "Creating new game: {}x{} with {} mines",
            params.columns, params.rows, params.mines
        );
        Ok(Self {
            board: generate_board(&params)?,
            cell_size,
            connection: None,
            last_activity: Instant::now(),
        })
    }

    /// Hosts an already built board, e.g. a preset layout.
    pub fn with_board(board: Board, cell_size: u32) -> Self {
        Self {
            board,
            cell_size,
            connection: None,
            last_activity: Instant::now(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn init_message(&self) -> ServerMessage {
        ServerMessage::Init {
            columns: self.board.columns(),
            rows: self.board.rows(),
            mines: self.board.mines(),
            cell_size: self.cell_size,
            field: self.board.views(),
        }
    }

    /// Applies one client message and returns the reply for the player, if
    /// anything changed.
    pub fn apply(&mut self, message: ClientMessage) -> Option<ServerMessage> {
        match message {
            ClientMessage::Click { x, y, button } => self.click(x, y, button),
            ClientMessage::Restart { params } => self.restart(params),
        }
    }

    fn click(&mut self, x: i32, y: i32, button: MouseButton) -> Option<ServerMessage> {
        let Some(action) = button.action() else {
            debug!("Ignoring {:?} button click", button);
            return None;
        };

        let Some(pos) = grid_position(x, y, self.cell_size) else {
            warn!("Click at pixel ({}, {}) maps to no cell", x, y);
            return None;
        };

        let status_before = self.board.status();
        if status_before.is_finished() {
            debug!("Ignoring {:?} at ({}, {}) on finished game", action, pos.x, pos.y);
            return None;
        }

        let before = self.board.views();
        let status = match self.board.click(pos, action) {
            Ok(status) => status,
            Err(e) => {
                warn!("Rejected click: {}", e);
                return None;
            }
        };

        let mut updates = changed_cells(&before, &self.board.views());
        if status == GameStatus::Lost {
            warn!("Player hit mine at ({}, {}) - game over!", pos.x, pos.y);
            updates.extend(self.board.mine_positions().into_iter().map(|pos| CellUpdate {
                pos,
                value: CellView::Mine,
            }));
        } else if status == GameStatus::Won {
            info!("Game won! All safe cells revealed.");
        }

        if updates.is_empty() && status == status_before {
            return None;
        }

        debug!("{} cells changed, status {:?}", updates.len(), status);
        Some(ServerMessage::Update {
            updates,
            status,
            banner: status.banner().map(String::from),
        })
    }

    fn restart(&mut self, params: GameParams) -> Option<ServerMessage> {
        info!(
            "Restarting game with new parameters: {}x{} with {} mines",
            params.columns, params.rows, params.mines
        );
        match generate_board(&params) {
            Ok(board) => {
                self.board = board;
                Some(self.init_message())
            }
            Err(e) => {
                warn!("Keeping current board, restart rejected: {}", e);
                None
            }
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn handle(&mut self, message: ClientMessage) {
        self.last_activity = Instant::now();
        if let Some(reply) = self.apply(message)
            && let Some(connection) = self.connection.as_mut()
        {
            send(&mut connection.sink, &reply).await;
        }
    }

    /// Makes `sink` the game's only connection and sends it the board.
    /// A previous connection is dropped.
    #[instrument(level = "trace", skip(self, sink))]
    pub async fn attach(&mut self, mut sink: Sink) -> Uuid {
        let id = Uuid::new_v4();
        send(&mut sink, &self.init_message()).await;
        if let Some(previous) = self.connection.replace(Connection { id, sink }) {
            info!("Connection {} replaced by {}", previous.id, id);
        }
        self.last_activity = Instant::now();
        id
    }

    pub fn detach(&mut self, id: &Uuid) {
        if self.is_current(id) {
            self.connection = None;
            info!("Connection {} detached", id);
        } else {
            debug!("Connection {} already replaced", id);
        }
        self.last_activity = Instant::now();
    }

    pub fn is_current(&self, id: &Uuid) -> bool {
        self.connection.as_ref().is_some_and(|c| &c.id == id)
    }

    pub fn has_active_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn should_cleanup(&self, inactive_timeout: Duration) -> bool {
        !self.has_active_connection() && self.last_activity.elapsed() >= inactive_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: u32 = 40;

    fn game(columns: usize, rows: usize, mines: &[(usize, usize)]) -> Game {
        let board =
            Board::from_mines(columns, rows, mines.iter().map(|&(x, y)| Pos::new(x, y))).unwrap();
        Game::with_board(board, CELL)
    }

    fn click(x: i32, y: i32, button: MouseButton) -> ClientMessage {
        ClientMessage::Click { x, y, button }
    }

    fn unpack(message: Option<ServerMessage>) -> (Vec<CellUpdate>, GameStatus, Option<String>) {
        match message {
            Some(ServerMessage::Update {
                updates,
                status,
                banner,
            }) => (updates, status, banner),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn new_rejects_too_many_mines() {
        let params = GameParams {
            columns: 2,
            rows: 2,
            mines: 5,
        };
        assert!(Game::new(params, CELL).is_err());
    }

    #[test]
    fn init_message_describes_board() {
        let game = game(3, 2, &[(0, 0)]);
        match game.init_message() {
            ServerMessage::Init {
                columns,
                rows,
                mines,
                cell_size,
                field,
            } => {
                assert_eq!((columns, rows, mines, cell_size), (3, 2, 1, CELL));
                assert_eq!(field.len(), 2);
                assert!(field.iter().flatten().all(|&v| v == CellView::Covered));
            }
            other => panic!("expected init, got {:?}", other),
        }
    }

    #[test]
    fn left_click_reveals_cell_under_pixel() {
        let mut game = game(3, 3, &[(0, 0)]);
        let (updates, status, banner) = unpack(game.apply(click(45, 45, MouseButton::Left)));
        assert_eq!(status, GameStatus::Playing);
        assert_eq!(banner, None);
        assert_eq!(
            updates,
            vec![CellUpdate {
                pos: Pos::new(1, 1),
                value: CellView::Numbered { adjacent: 1 }
            }]
        );
    }

    #[test]
    fn right_click_toggles_flag() {
        let mut game = game(3, 3, &[(0, 0)]);
        let (updates, _, _) = unpack(game.apply(click(45, 85, MouseButton::Right)));
        assert_eq!(updates[0].pos, Pos::new(1, 2));
        assert_eq!(updates[0].value, CellView::Flagged);
        assert!(game.board().cell(Pos::new(1, 2)).unwrap().is_flagged());
    }

    #[test]
    fn losing_click_exposes_mines() {
        let mut game = game(3, 3, &[(0, 0), (2, 2)]);
        let (updates, status, banner) = unpack(game.apply(click(5, 5, MouseButton::Left)));
        assert_eq!(status, GameStatus::Lost);
        assert_eq!(banner.as_deref(), Some("YOU LOST!"));
        assert!(updates.iter().all(|u| u.value == CellView::Mine));
        assert_eq!(updates.len(), 2);

        assert!(game.apply(click(45, 45, MouseButton::Left)).is_none());
        assert!(game.board().cell(Pos::new(1, 1)).unwrap().is_covered());
    }

    #[test]
    fn winning_click_reports_banner() {
        let mut game = game(3, 3, &[(2, 2)]);
        let (updates, status, banner) = unpack(game.apply(click(0, 0, MouseButton::Left)));
        assert_eq!(status, GameStatus::Won);
        assert_eq!(banner.as_deref(), Some("You Won!"));
        assert_eq!(updates.len(), 8);
    }

    #[test]
    fn ignored_clicks_produce_no_reply() {
        let mut game = game(2, 2, &[(0, 0)]);
        assert!(game.apply(click(5, 5, MouseButton::Middle)).is_none());
        assert!(game.apply(click(-3, 5, MouseButton::Left)).is_none());
        assert!(game.apply(click(200, 5, MouseButton::Left)).is_none());

        game.apply(click(5, 5, MouseButton::Right));
        assert!(game.apply(click(5, 5, MouseButton::Left)).is_none());
        assert_eq!(game.board().status(), GameStatus::Playing);
    }

    #[test]
    fn restart_replaces_board_unless_invalid() {
        let mut game = game(2, 2, &[(0, 0)]);
        let reply = game.apply(ClientMessage::Restart {
            params: GameParams {
                columns: 4,
                rows: 5,
                mines: 3,
            },
        });
        assert!(matches!(reply, Some(ServerMessage::Init { columns: 4, rows: 5, mines: 3, .. })));

        let reply = game.apply(ClientMessage::Restart {
            params: GameParams {
                columns: 1,
                rows: 1,
                mines: 2,
            },
        });
        assert!(reply.is_none());
        assert_eq!(game.board().columns(), 4);
    }

    #[test]
    fn idle_game_without_connection_is_cleaned_up() {
        let game = game(2, 2, &[]);
        assert!(!game.has_active_connection());
        assert!(game.should_cleanup(Duration::ZERO));
        assert!(!game.should_cleanup(Duration::from_secs(3600)));
        assert!(!game.is_current(&Uuid::new_v4()));
    }

    #[test]
    fn insert_game_assigns_distinct_ids() {
        let games: Games = Arc::new(DashMap::new());
        let first = insert_game(&games, game(2, 2, &[]));
        let second = insert_game(&games, game(3, 3, &[(1, 1)]));
        assert_ne!(first, second);
        assert_eq!(first.len(), GAME_ID_LENGTH);
        assert_eq!(games.len(), 2);

        let stored = games.get(&second).unwrap().value().clone();
        assert_eq!(stored.try_lock().unwrap().board().columns(), 3);
    }

    #[tokio::test]
    async fn handle_without_connection_still_applies() {
        let mut game = game(2, 1, &[(0, 0)]);
        game.handle(click(45, 5, MouseButton::Left)).await;
        assert_eq!(game.board().status(), GameStatus::Won);
    }
}
