//! Append-only turn log entries.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::roster::{PlayerId, Team};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Turn {
    Clue {
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        player_id: PlayerId,
        word: String,
        number: u8,
    },
    Guess {
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        player_id: PlayerId,
        tile: usize,
        correct: bool,
    },
    End {
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        winner: Team,
    },
}

impl Turn {
    pub fn is_end(&self) -> bool {
        matches!(self, Turn::End { .. })
    }
}
