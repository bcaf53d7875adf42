//! Single-player minesweeper host.
//!
//! `POST /create` builds a board and returns its id; `GET /ws?id=...` opens
//! the WebSocket a renderer uses to send pixel clicks and receive cell
//! updates. Idle games are reaped by a background task.

use std::sync::Arc;

use dashmap::DashMap;
use rocket::{Build, Rocket, routes};

pub mod cleanup;
pub mod config;
pub mod cors;
pub mod logic;
pub mod routes;

use crate::{cleanup::CleanupFairing, config::Config, cors::create_cors, logic::Games};

pub fn build(config: Config) -> Rocket<Build> {
    let games: Games = Arc::new(DashMap::new());

    rocket::build()
        .attach(create_cors(&config.allowed_origins))
        .attach(CleanupFairing)
        .manage(games)
        .manage(config)
        .mount("/", routes![routes::create_game, routes::websocket_handler])
}
