use rocket::{
    State,
    futures::StreamExt,
    get,
    http::Status,
    post,
    serde::json::{self, Json},
};
use rocket_ws::{Channel, Message, WebSocket};
use tracing::{debug, error, info, instrument, warn};

use minesweeper_common::{
    models::{CreateRequest, CreateResponse},
    protocol::ClientMessage,
};

use crate::{
    config::Config,
    logic::{Game, Games, insert_game},
};

/// Creates a game. Fields missing from the body, or the whole body, fall
/// back to the configured default board.
#[post("/create", data = "<request>")]
pub fn create_game(
    request: Result<Json<CreateRequest>, json::Error<'_>>,
    games: &State<Games>,
    config: &State<Config>,
) -> Result<Json<CreateResponse>, Status> {
    let request = match request {
        Ok(Json(request)) => request,
        Err(json::Error::Parse(raw, _)) if raw.trim().is_empty() => CreateRequest::default(),
        Err(json::Error::Io(e)) => {
            warn!("Failed to read game creation body: {}", e);
            return Err(Status::BadRequest);
        }
        Err(e) => {
            warn!("Rejected game creation body: {}", e);
            return Err(Status::UnprocessableEntity);
        }
    };

    let params = request.resolve(config.default_params);
    match Game::new(params, config.cell_size) {
        Ok(game) => Ok(Json(CreateResponse {
            id: insert_game(games, game),
        })),
        Err(e) => {
            warn!("Rejected game creation: {}", e);
            Err(Status::UnprocessableEntity)
        }
    }
}

#[get("/ws?<id>")]
#[instrument(level = "trace", skip(ws, games), fields(game_id = %id))]
pub fn websocket_handler(
    ws: WebSocket,
    games: &State<Games>,
    id: String,
) -> Result<Channel<'static>, Status> {
    let game = match games.get(&id) {
        None => {
            warn!("WebSocket connection attempt for non-existent game: {}", id);
            return Err(Status::NotFound);
        }
        Some(value) => value.value().clone(),
    };

    Ok(ws.channel(move |stream| {
        Box::pin(async move {
            let (write, mut read) = stream.split();

            let stream_id = {
                let mut game = game.lock().await;
                game.attach(write).await
            };
            info!("Player connected to game {} (stream: {})", id, stream_id);

            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            let mut game = game.lock().await;
                            if !game.is_current(&stream_id) {
                                info!("Stream {} was replaced, closing", stream_id);
                                break;
                            }
                            game.handle(message).await;
                        }
                        Err(e) => {
                            warn!("Invalid message in game {}: {} - Error: {}", id, text, e);
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Err(e) => {
                        error!("WebSocket error in game {} (stream: {}): {}", id, stream_id, e);
                        break;
                    }
                    _ => debug!("Ignoring non-text message in game {}", id),
                }
            }

            game.lock().await.detach(&stream_id);
            info!("Player disconnected from game {} (stream: {})", id, stream_id);
            Ok(())
        })
    }))
}
