use minesweeper_server::{build, config::Config};
use rocket::{Build, Rocket};
use tracing::info;

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("Starting Minesweeper server");

    let config = Config::from_env();
    info!(
        "Default board {}x{} with {} mines, cell size {}px",
        config.default_params.columns,
        config.default_params.rows,
        config.default_params.mines,
        config.cell_size
    );
    info!("Endpoints: POST /create, GET /ws");

    build(config)
}
