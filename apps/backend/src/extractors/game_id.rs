use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Game id taken from the `{game_id}` path segment.
///
/// Only the format is checked here; existence is the service's concern.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct GameId(pub Uuid);

impl FromRequest for GameId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_uuid(req, "game_id", ErrorCode::InvalidGameId).map(GameId))
    }
}

/// Player id taken from the `{player_id}` path segment.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPathId(pub Uuid);

impl FromRequest for PlayerPathId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(path_uuid(req, "player_id", ErrorCode::InvalidPlayerId).map(PlayerPathId))
    }
}

fn path_uuid(req: &HttpRequest, name: &str, code: ErrorCode) -> Result<Uuid, AppError> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| AppError::bad_request(code, format!("Missing {name} parameter")))?;
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(code, format!("Invalid {name}: {raw}")))
}
