// Game endpoints end to end: create, show, list, turn actions, rematch, delete.

use actix_web::http::header::{IF_NONE_MATCH, LOCATION};
use actix_web::test;
use codeword_backend::domain::board::TileKind;
use codeword_backend::domain::board_view::TileKindView;
use codeword_backend::domain::engine::GamePhase;
use codeword_backend::domain::roster::Role;
use codeword_backend::domain::PlayerGameView;
use codeword_backend::http::etag::game_etag;
use codeword_test_support::unique_helpers::unique_user;
use serde_json::{json, Value};

use crate::common::assert_problem_details_structure;
use crate::support::factory::{hidden_tiles, play_to_win, started_game, starting_team};
use crate::support::http::{as_user, etag_of};
use crate::support::{build_test_state, create_test_app};

fn redacted_count(view: &PlayerGameView) -> usize {
    view.board
        .0
        .iter()
        .filter(|t| t.kind == TileKindView::Redacted)
        .count()
}

#[actix_web::test]
async fn create_returns_created_lobby_with_location_and_etag() {
    let (state, _) = build_test_state();
    let app = create_test_app(state).with_prod_routes().build().await;
    let user = unique_user();

    let req = as_user(test::TestRequest::post().uri("/api/games"), user).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 201);
    let etag = etag_of(&resp);
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Location header")
        .to_string();

    let view: PlayerGameView = test::read_body_json(resp).await;
    assert_eq!(view.version, 0);
    assert_eq!(view.phase, GamePhase::Lobby);
    assert!(!view.started);
    assert_eq!(view.players.len(), 1);
    assert_eq!(view.you, Some(view.players[0].id));
    assert_eq!(location, format!("/api/games/{}", view.game_id));
    assert_eq!(etag, game_etag(view.game_id, 0));
    assert_eq!(redacted_count(&view), 25, "lobby boards are hidden");
}

#[actix_web::test]
async fn requests_without_user_are_unauthorized() {
    let (state, _) = build_test_state();
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post().uri("/api/games").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 401, "UNAUTHORIZED").await;

    let req = test::TestRequest::get()
        .uri("/api/games")
        .insert_header(("x-user-id", "not-a-uuid"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 401, "UNAUTHORIZED").await;
}

#[actix_web::test]
async fn malformed_or_unknown_game_id() {
    let (state, _) = build_test_state();
    let app = create_test_app(state).with_prod_routes().build().await;
    let user = unique_user();

    let req = as_user(test::TestRequest::get().uri("/api/games/nope"), user).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 400, "INVALID_GAME_ID").await;

    let uri = format!("/api/games/{}", uuid::Uuid::new_v4());
    let req = as_user(test::TestRequest::get().uri(&uri), user).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 404, "GAME_NOT_FOUND").await;
}

#[actix_web::test]
async fn show_honours_if_none_match() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, stored) = started_game(&service).await.expect("started game");
    let uri = format!("/api/games/{}", table.game_id);
    let current = game_etag(stored.id, stored.version);

    let req = as_user(test::TestRequest::get().uri(&uri), table.creator())
        .insert_header((IF_NONE_MATCH, current.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 304);
    assert_eq!(etag_of(&resp), current);

    let stale = game_etag(stored.id, stored.version - 1);
    let req = as_user(test::TestRequest::get().uri(&uri), table.creator())
        .insert_header((IF_NONE_MATCH, stale))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn board_is_revealed_only_to_transmitters() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, stored) = started_game(&service).await.expect("started game");
    let team = starting_team(&stored);
    let uri = format!("/api/games/{}", table.game_id);

    for (user, hidden) in [
        (table.user(team, Role::Transmitter), 0),
        (table.user(team.other(), Role::Transmitter), 0),
        (table.user(team, Role::Decoder), 25),
    ] {
        let req = as_user(test::TestRequest::get().uri(&uri), user).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
        let view: PlayerGameView = test::read_body_json(resp).await;
        assert_eq!(redacted_count(&view), hidden);
    }
}

#[actix_web::test]
async fn outsiders_cannot_read_a_game() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, _) = started_game(&service).await.expect("started game");

    let req = as_user(
        test::TestRequest::get().uri(&format!("/api/games/{}", table.game_id)),
        unique_user(),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.headers().get(actix_web::http::header::ETAG).is_none());
    let body = assert_problem_details_structure(resp, 403, "NOT_A_MEMBER").await;
    assert!(body.get("players").is_none());
}

#[actix_web::test]
async fn list_shows_callers_games() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let user = unique_user();
    let game = service.create(user).await.expect("create");
    service.create(unique_user()).await.expect("create other");

    let req = as_user(test::TestRequest::get().uri("/api/games"), user).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    let games = body["games"].as_array().expect("games array");
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["game_id"], game.id.to_string());
}

#[actix_web::test]
async fn transmit_then_decode_over_http() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, stored) = started_game(&service).await.expect("started game");
    let team = starting_team(&stored);

    let req = as_user(
        test::TestRequest::put().uri(&format!("/api/games/{}/transmit", table.game_id)),
        table.user(team, Role::Transmitter),
    )
    .set_json(json!({ "word": "ocean", "number": 2 }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(etag_of(&resp), game_etag(stored.id, stored.version + 1));

    let tile = hidden_tiles(&stored, TileKind::from(team))[0];
    let req = as_user(
        test::TestRequest::put().uri(&format!("/api/games/{}/decode", table.game_id)),
        table.user(team, Role::Decoder),
    )
    .set_json(json!({ "tile": tile }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let view: PlayerGameView = test::read_body_json(resp).await;
    assert!(view.board.0[tile].revealed);
    assert_eq!(view.turns.len(), 2);
    assert_eq!(view.version, stored.version + 2);
}

#[actix_web::test]
async fn transmit_rejects_fractional_number() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, stored) = started_game(&service).await.expect("started game");
    let team = starting_team(&stored);
    let uri = format!("/api/games/{}/transmit", table.game_id);

    for number in [json!(1.5), json!(0), json!(9)] {
        let req = as_user(
            test::TestRequest::put().uri(&uri),
            table.user(team, Role::Transmitter),
        )
        .set_json(json!({ "word": "ocean", "number": number }))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_problem_details_structure(resp, 422, "INVALID_NUMBER").await;
    }
}

#[actix_web::test]
async fn decode_rejects_out_of_range_tiles() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, stored) = started_game(&service).await.expect("started game");
    let team = starting_team(&stored);
    service
        .give_clue(table.game_id, table.user(team, Role::Transmitter), "ocean", 1, None)
        .await
        .expect("clue");
    let uri = format!("/api/games/{}/decode", table.game_id);

    for tile in [-1, 25] {
        let req = as_user(
            test::TestRequest::put().uri(&uri),
            table.user(team, Role::Decoder),
        )
        .set_json(json!({ "tile": tile }))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_problem_details_structure(resp, 422, "NO_SUCH_TILE").await;
    }
}

#[actix_web::test]
async fn out_of_turn_action_is_forbidden() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, stored) = started_game(&service).await.expect("started game");
    let team = starting_team(&stored);

    let req = as_user(
        test::TestRequest::put().uri(&format!("/api/games/{}/end-turn", table.game_id)),
        table.user(team, Role::Decoder),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 403, "NOT_YOUR_TURN").await;
}

#[actix_web::test]
async fn start_with_incomplete_roster_conflicts() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let user = unique_user();
    let game = service.create(user).await.expect("create");

    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/games/{}/start", game.id)),
        user,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 409, "NOT_ENOUGH_PLAYERS").await;
}

#[actix_web::test]
async fn rematch_is_created_once() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let (table, stored) = started_game(&service).await.expect("started game");
    play_to_win(&service, &table, stored).await.expect("finish game");
    let uri = format!("/api/games/{}/rematch", table.game_id);

    let mut ids = Vec::new();
    for user in [table.creator(), table.users[2]] {
        let req = as_user(test::TestRequest::post().uri(&uri), user).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);
        let view: PlayerGameView = test::read_body_json(resp).await;
        assert_eq!(view.phase, GamePhase::Lobby);
        ids.push(view.game_id);
    }
    assert_eq!(ids[0], ids[1]);
}

#[actix_web::test]
async fn delete_then_gone() {
    let (state, _) = build_test_state();
    let service = state.games();
    let app = create_test_app(state).with_prod_routes().build().await;
    let user = unique_user();
    let game = service.create(user).await.expect("create");
    let uri = format!("/api/games/{}", game.id);

    let req = as_user(test::TestRequest::delete().uri(&uri), user).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    let req = as_user(test::TestRequest::get().uri(&uri), user).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 404, "GAME_NOT_FOUND").await;
}
