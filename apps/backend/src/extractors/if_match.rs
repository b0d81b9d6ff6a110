use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::IF_MATCH;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::http::etag::parse_game_etag;

/// Version pinned by an `If-Match` header, if the client sent one.
///
/// `If-Match: *` pins nothing. An ETag naming a different game than the
/// `{game_id}` path segment is rejected as a lost race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfMatch(pub Option<u64>);

impl FromRequest for IfMatch {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse(req))
    }
}

fn parse(req: &HttpRequest) -> Result<IfMatch, AppError> {
    let Some(value) = req.headers().get(IF_MATCH) else {
        return Ok(IfMatch(None));
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::bad_request(ErrorCode::InvalidHeader, "If-Match is not valid ASCII"))?;
    if raw.trim() == "*" {
        return Ok(IfMatch(None));
    }

    let (etag_game, version) = parse_game_etag(raw)?;
    let path_game = req
        .match_info()
        .get("game_id")
        .and_then(|id| Uuid::parse_str(id).ok());
    if let Some(path_game) = path_game {
        if path_game != etag_game {
            return Err(AppError::conflict(
                ErrorCode::OptimisticLock,
                format!("If-Match refers to game {etag_game}, not {path_game}"),
            ));
        }
    }
    Ok(IfMatch(Some(version)))
}
