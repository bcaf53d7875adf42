use minesweeper_common::models::{CreateResponse, GameParams};
use minesweeper_server::{build, config::Config, logic::Games};
use rocket::{
    http::{ContentType, Status},
    local::blocking::Client,
};

fn client_with(config: Config) -> Client {
    Client::tracked(build(config)).expect("valid rocket instance")
}

fn client() -> Client {
    client_with(Config::default())
}

fn large_default_config() -> Config {
    Config {
        default_params: GameParams {
            columns: 16,
            rows: 12,
            mines: 30,
        },
        ..Config::default()
    }
}

fn stored_games(client: &Client) -> usize {
    client.rocket().state::<Games>().expect("games are managed").len()
}

fn stored_board_size(client: &Client, id: &str) -> (usize, usize, usize) {
    let games = client.rocket().state::<Games>().expect("games are managed");
    let game = games.get(id).expect("game is stored").value().clone();
    let game = game.try_lock().expect("game is not in use");
    let board = game.board();
    (board.columns(), board.rows(), board.mines())
}

fn post_raw(client: &Client, body: &str) -> (Status, Option<CreateResponse>) {
    let response = client
        .post("/create")
        .header(ContentType::JSON)
        .body(body)
        .dispatch();
    let status = response.status();
    (status, response.into_json())
}

#[test]
fn create_with_params_stores_game() {
    let client = client();
    let response = client
        .post("/create")
        .json(&GameParams {
            columns: 16,
            rows: 16,
            mines: 40,
        })
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: CreateResponse = response.into_json().expect("json body");
    assert_eq!(body.id.len(), 5);
    assert_eq!(stored_board_size(&client, &body.id), (16, 16, 40));
}

#[test]
fn create_without_body_uses_configured_defaults() {
    let client = client_with(large_default_config());
    let response = client.post("/create").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: CreateResponse = response.into_json().expect("json body");
    assert_eq!(stored_board_size(&client, &body.id), (16, 12, 30));
}

#[test]
fn missing_fields_come_from_configured_defaults() {
    let client = client_with(large_default_config());
    let (status, body) = post_raw(&client, r#"{"mines": 1}"#);
    assert_eq!(status, Status::Ok);
    let id = body.expect("json body").id;
    assert_eq!(stored_board_size(&client, &id), (16, 12, 1));

    let (_, body) = post_raw(&client, "{}");
    let id = body.expect("json body").id;
    assert_eq!(stored_board_size(&client, &id), (16, 12, 30));
}

#[test]
fn malformed_body_is_rejected() {
    let client = client();
    for body in [
        r#"{"columns": -4, "rows": 2, "mines": 1}"#,
        r#"{"columns": "wide"}"#,
        "eight by eight",
    ] {
        let (status, _) = post_raw(&client, body);
        assert_eq!(status, Status::UnprocessableEntity, "body {:?}", body);
    }
    assert_eq!(stored_games(&client), 0);
}

#[test]
fn create_rejects_more_mines_than_cells() {
    let client = client();
    let response = client
        .post("/create")
        .json(&GameParams {
            columns: 2,
            rows: 2,
            mines: 5,
        })
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    assert_eq!(stored_games(&client), 0);
}
