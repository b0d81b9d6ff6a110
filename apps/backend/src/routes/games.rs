//! Game-related HTTP routes.
//!
//! Every response carries the caller's own view of the game and an ETag
//! of the stored version. Mutations honour `If-Match`.

use actix_web::http::header::{ETAG, IF_NONE_MATCH, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::engine;
use crate::domain::player_view::{view_for, PlayerGameView};
use crate::domain::roster::{Role, Team, UserId};
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::extractors::{CurrentUser, GameId, IfMatch, PlayerPathId, ValidatedJson};
use crate::http::etag::game_etag;
use crate::state::app_state::AppState;
use crate::store::StoredGame;

#[derive(Debug, Serialize)]
struct GameListResponse {
    games: Vec<PlayerGameView>,
}

#[derive(Debug, Deserialize)]
struct TransmitRequest {
    word: String,
    number: f64,
}

#[derive(Debug, Deserialize)]
struct DecodeRequest {
    tile: i64,
}

#[derive(Debug, Deserialize)]
struct JoinRequest {
    /// Defaults to the caller.
    user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct AssignRequest {
    team: Option<Team>,
    role: Option<Role>,
}

fn game_response(status: StatusCode, stored: &StoredGame, user_id: UserId) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((ETAG, game_etag(stored.id, stored.version)))
        .json(view_for(stored.id, stored.version, &stored.game, user_id))
}

/// GET /api/games
async fn list_games(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let games = app_state
        .games()
        .list(user.id)
        .await?
        .iter()
        .map(|stored| view_for(stored.id, stored.version, &stored.game, user.id))
        .collect();
    Ok(HttpResponse::Ok().json(GameListResponse { games }))
}

/// POST /api/games
async fn create_game(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stored = app_state.games().create(user.id).await?;
    let mut response = game_response(StatusCode::CREATED, &stored, user.id);
    if let Ok(location) = format!("/api/games/{}", stored.id).parse() {
        response.headers_mut().insert(LOCATION, location);
    }
    Ok(response)
}

/// GET /api/games/{game_id}
///
/// Supports `If-None-Match`: a matching ETag (or `*`) yields `304 Not Modified`.
async fn get_game(
    http_req: HttpRequest,
    game_id: GameId,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stored = app_state.games().show(game_id.0, user.id).await?;
    let etag_value = game_etag(stored.id, stored.version);

    if let Some(if_none_match) = http_req.headers().get(IF_NONE_MATCH) {
        if let Ok(client_etag) = if_none_match.to_str() {
            let matches = client_etag.trim() == "*"
                || client_etag
                    .split(',')
                    .map(str::trim)
                    .any(|etag| etag == etag_value);
            if matches {
                return Ok(HttpResponse::NotModified()
                    .insert_header((ETAG, etag_value))
                    .finish());
            }
        }
    }

    Ok(game_response(StatusCode::OK, &stored, user.id))
}

/// POST /api/games/{game_id}/start
async fn start_game(
    game_id: GameId,
    user: CurrentUser,
    if_match: IfMatch,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stored = app_state
        .games()
        .start(game_id.0, user.id, if_match.0)
        .await?;
    Ok(game_response(StatusCode::OK, &stored, user.id))
}

/// PUT /api/games/{game_id}/transmit
async fn transmit(
    game_id: GameId,
    user: CurrentUser,
    if_match: IfMatch,
    body: ValidatedJson<TransmitRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let number = engine::clue_number(body.number)?;
    let stored = app_state
        .games()
        .give_clue(game_id.0, user.id, &body.word, number, if_match.0)
        .await?;
    Ok(game_response(StatusCode::OK, &stored, user.id))
}

/// PUT /api/games/{game_id}/decode
async fn decode(
    game_id: GameId,
    user: CurrentUser,
    if_match: IfMatch,
    body: ValidatedJson<DecodeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tile = usize::try_from(body.tile).map_err(|_| {
        DomainError::validation(
            ValidationKind::NoSuchTile,
            format!("Tile {} is outside the board", body.tile),
        )
    })?;
    let stored = app_state
        .games()
        .make_guess(game_id.0, user.id, tile, if_match.0)
        .await?;
    Ok(game_response(StatusCode::OK, &stored, user.id))
}

/// PUT /api/games/{game_id}/end-turn
async fn end_turn(
    game_id: GameId,
    user: CurrentUser,
    if_match: IfMatch,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stored = app_state
        .games()
        .end_turn(game_id.0, user.id, if_match.0)
        .await?;
    Ok(game_response(StatusCode::OK, &stored, user.id))
}

/// POST /api/games/{game_id}/rematch
async fn rematch(
    game_id: GameId,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stored = app_state.games().rematch(game_id.0, user.id).await?;
    Ok(game_response(StatusCode::CREATED, &stored, user.id))
}

/// DELETE /api/games/{game_id}
async fn delete_game(
    game_id: GameId,
    user: CurrentUser,
    if_match: IfMatch,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state
        .games()
        .destroy(game_id.0, user.id, if_match.0)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/games/{game_id}/players
async fn add_player(
    game_id: GameId,
    user: CurrentUser,
    if_match: IfMatch,
    body: ValidatedJson<JoinRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let new_user = body.user_id.unwrap_or(user.id);
    let stored = app_state
        .games()
        .join(game_id.0, user.id, new_user, if_match.0)
        .await?;
    Ok(game_response(StatusCode::CREATED, &stored, user.id))
}

/// PUT /api/games/{game_id}/players/{player_id}
async fn update_player(
    game_id: GameId,
    player_id: PlayerPathId,
    user: CurrentUser,
    if_match: IfMatch,
    body: ValidatedJson<AssignRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stored = app_state
        .games()
        .assign(
            game_id.0,
            user.id,
            player_id.0,
            body.team,
            body.role,
            if_match.0,
        )
        .await?;
    Ok(game_response(StatusCode::OK, &stored, user.id))
}

/// DELETE /api/games/{game_id}/players/{player_id}
async fn remove_player(
    game_id: GameId,
    player_id: PlayerPathId,
    user: CurrentUser,
    if_match: IfMatch,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stored = app_state
        .games()
        .leave(game_id.0, user.id, player_id.0, if_match.0)
        .await?;
    Ok(game_response(StatusCode::OK, &stored, user.id))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_games))
            .route(web::post().to(create_game)),
    )
    .service(
        web::resource("/{game_id}")
            .route(web::get().to(get_game))
            .route(web::delete().to(delete_game)),
    )
    .service(web::resource("/{game_id}/start").route(web::post().to(start_game)))
    .service(web::resource("/{game_id}/transmit").route(web::put().to(transmit)))
    .service(web::resource("/{game_id}/decode").route(web::put().to(decode)))
    .service(web::resource("/{game_id}/end-turn").route(web::put().to(end_turn)))
    .service(web::resource("/{game_id}/rematch").route(web::post().to(rematch)))
    .service(web::resource("/{game_id}/players").route(web::post().to(add_player)))
    .service(
        web::resource("/{game_id}/players/{player_id}")
            .route(web::put().to(update_player))
            .route(web::delete().to(remove_player)),
    );
}
