use serde::{Deserialize, Serialize};

use crate::domain::player_view::PlayerGameView;
use crate::domain::roster::{GameId, UserId};

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello {
        protocol: i32,
    },
    Transmit {
        game_id: GameId,
        word: String,
        number: f64,
    },
    Decode {
        game_id: GameId,
        tile: usize,
    },
    EndTurn {
        game_id: GameId,
    },
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
        user_id: UserId,
    },

    Ack {
        message: String,
    },

    GameState {
        game: PlayerGameView,
    },

    /// A command reached the game and was refused.
    Rejected {
        game_id: GameId,
        code: String,
        message: String,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadProtocol,
    BadRequest,
    Internal,
}
