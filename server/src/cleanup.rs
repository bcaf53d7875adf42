use std::time::Duration;

use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
};
use tokio::time;
use tracing::{debug, info, warn};

use crate::{config::Config, logic::Games};

pub async fn start_cleanup_task(games: Games, interval: Duration, inactive_timeout: Duration) {
    let interval = interval.max(Duration::from_secs(1));
    let mut ticker = time::interval(interval);

    info!(
        "Started game cleanup task: checking every {}s, inactive timeout: {}s",
        interval.as_secs(),
        inactive_timeout.as_secs()
    );

    loop {
        ticker.tick().await;
        cleanup_games(&games, inactive_timeout);
    }
}

/// Removes games nobody is connected to that have been idle for
/// `inactive_timeout`. Games locked by a player are skipped this round.
pub fn cleanup_games(games: &Games, inactive_timeout: Duration) -> usize {
    let mut games_to_remove = Vec::new();

    for entry in games.iter() {
        if let Ok(game) = entry.value().try_lock()
            && game.should_cleanup(inactive_timeout)
        {
            games_to_remove.push(entry.key().clone());
        }
    }

    let removed_count = games_to_remove.len();
    for game_id in games_to_remove {
        games.remove(&game_id);
        debug!("Cleaned up game: {}", game_id);
    }

    if removed_count > 0 {
        info!("Cleaned up {} inactive games", removed_count);
    }
    removed_count
}

pub struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Cleanup Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        match (rocket.state::<Games>(), rocket.state::<Config>()) {
            (Some(games), Some(config)) => {
                let games = games.clone();
                let interval = config.cleanup_interval;
                let inactive_timeout = config.inactive_timeout;
                tokio::spawn(async move {
                    start_cleanup_task(games, interval, inactive_timeout).await;
                });
            }
            _ => warn!("Game storage or config missing, cleanup task not started"),
        }
        Ok(rocket)
    }
}
