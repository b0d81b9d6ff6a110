use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::roster::UserId;
use crate::error::AppError;

/// Header set by the upstream gateway once it has authenticated the caller.
pub const USER_HEADER: &str = "x-user-id";

/// The calling user, as asserted by the gateway.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse(req))
    }
}

fn parse(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    let raw = req
        .headers()
        .get(USER_HEADER)
        .ok_or_else(|| AppError::unauthorized(format!("Missing {USER_HEADER} header")))?
        .to_str()
        .map_err(|_| AppError::unauthorized(format!("{USER_HEADER} is not valid ASCII")))?;

    let id = Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::unauthorized(format!("{USER_HEADER} must be a UUID")))?;
    Ok(CurrentUser { id })
}
