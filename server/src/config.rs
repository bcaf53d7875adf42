use std::{env, str::FromStr, time::Duration};

use minesweeper_common::models::GameParams;
use tracing::warn;

/// Settings fixed at startup. Read from the environment by
/// [`Config::from_env`]; anything missing or unparsable falls back to the
/// [`Default`] value.
#[derive(Debug, Clone)]
pub struct Config {
    /// Board used by `POST /create` when the request has no body.
    pub default_params: GameParams,
    /// Edge length of one cell on the renderer's canvas, in pixels.
    pub cell_size: u32,
    pub cleanup_interval: Duration,
    pub inactive_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_params: GameParams::default(),
            cell_size: 40,
            cleanup_interval: Duration::from_secs(60),
            inactive_timeout: Duration::from_secs(600),
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let default_params = GameParams {
            columns: parse_or(&lookup, "GRID_COLUMNS", defaults.default_params.columns),
            rows: parse_or(&lookup, "GRID_ROWS", defaults.default_params.rows),
            mines: parse_or(&lookup, "MINE_COUNT", defaults.default_params.mines),
        };

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.allowed_origins,
        };

        Self {
            default_params,
            cell_size: parse_or(&lookup, "CELL_SIZE", defaults.cell_size),
            cleanup_interval: Duration::from_secs(parse_or(
                &lookup,
                "CLEANUP_INTERVAL_SECONDS",
                defaults.cleanup_interval.as_secs(),
            )),
            inactive_timeout: Duration::from_secs(parse_or(
                &lookup,
                "INACTIVE_GAME_TIMEOUT_SECONDS",
                defaults.inactive_timeout.as_secs(),
            )),
            allowed_origins,
        }
    }
}
