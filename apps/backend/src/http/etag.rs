//! ETag helpers for optimistic concurrency control.
//!
//! A game's ETag carries its store version, so clients can pin a write to
//! the state they last saw with `If-Match`.

use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Format: `"game-{id}-v{version}"` (quoted, as HTTP requires).
///
/// # Example
/// ```
/// # use codeword_backend::http::etag::game_etag;
/// let id = uuid::Uuid::nil();
/// assert_eq!(game_etag(id, 5), format!(r#""game-{id}-v5""#));
/// ```
pub fn game_etag(id: Uuid, version: u64) -> String {
    format!(r#""game-{id}-v{version}""#)
}

/// Extract the game id and version from a game ETag. Quotes and a weak `W/`
/// prefix are tolerated.
///
/// # Errors
/// `InvalidHeader` bad request when the value is not `game-{uuid}-v{version}`
/// or the version is not a non-negative integer.
pub fn parse_game_etag(s: &str) -> Result<(Uuid, u64), AppError> {
    let s = s.trim().trim_start_matches("W/").trim_matches('"');
    let malformed = || {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag format: expected \"game-{{id}}-v{{version}}\", got: \"{s}\""),
        )
    };

    let rest = s.strip_prefix("game-").ok_or_else(malformed)?;
    let (id_str, version_str) = rest.rsplit_once("-v").ok_or_else(malformed)?;
    let id = Uuid::parse_str(id_str).map_err(|_| malformed())?;

    let version = version_str.parse::<u64>().map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag format: version must be an integer, got: \"{version_str}\""),
        )
    })?;
    Ok((id, version))
}
