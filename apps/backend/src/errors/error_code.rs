//! Error codes for the codeword backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that appear
//! in HTTP responses and WebSocket error frames.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request handling
    /// Missing or malformed `x-user-id` header
    Unauthorized,
    InvalidHeader,
    InvalidGameId,
    InvalidPlayerId,
    BadRequest,

    // Rule violations
    InvalidClue,
    InvalidNumber,
    NumberExceedsRemaining,
    NoSuchTile,
    AlreadyRevealed,
    InsufficientWords,
    GameFull,

    // Lifecycle
    GameNotStarted,
    GameAlreadyStarted,
    GameOver,
    GameNotCompleted,
    NotEnoughPlayers,
    IncompleteRoster,

    // Authorization
    WrongRole,
    NotYourTurn,
    NotAMember,

    // Conflicts
    OptimisticLock,
    SeatTaken,
    AlreadyJoined,

    // Not found
    GameNotFound,
    PlayerNotFound,

    // System
    NoMatchingPlayer,
    CorruptBoard,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// The exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidGameId => "INVALID_GAME_ID",
            Self::InvalidPlayerId => "INVALID_PLAYER_ID",
            Self::BadRequest => "BAD_REQUEST",

            Self::InvalidClue => "INVALID_CLUE",
            Self::InvalidNumber => "INVALID_NUMBER",
            Self::NumberExceedsRemaining => "NUMBER_EXCEEDS_REMAINING",
            Self::NoSuchTile => "NO_SUCH_TILE",
            Self::AlreadyRevealed => "ALREADY_REVEALED",
            Self::InsufficientWords => "INSUFFICIENT_WORDS",
            Self::GameFull => "GAME_FULL",

            Self::GameNotStarted => "GAME_NOT_STARTED",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::GameOver => "GAME_OVER",
            Self::GameNotCompleted => "GAME_NOT_COMPLETED",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::IncompleteRoster => "INCOMPLETE_ROSTER",

            Self::WrongRole => "WRONG_ROLE",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::NotAMember => "NOT_A_MEMBER",

            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::SeatTaken => "SEAT_TAKEN",
            Self::AlreadyJoined => "ALREADY_JOINED",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",

            Self::NoMatchingPlayer => "NO_MATCHING_PLAYER",
            Self::CorruptBoard => "CORRUPT_BOARD",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
