//! Game persistence contract.

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::engine::Game;
use crate::domain::roster::{GameId, UserId};
use crate::errors::domain::DomainError;

pub mod memory;

pub use memory::MemoryGameStore;

/// A game together with its store bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredGame {
    pub id: GameId,
    /// Optimistic-concurrency counter. Starts at 0, +1 per successful save.
    pub version: u64,
    pub game: Game,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    /// Set once a rematch has been created from this game.
    pub rematch_id: Option<GameId>,
}

impl StoredGame {
    pub fn new(id: GameId, game: Game, at: OffsetDateTime) -> Self {
        Self {
            id,
            version: 0,
            game,
            created_at: at,
            updated_at: at,
            deleted_at: None,
            rematch_id: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn has_user(&self, user_id: UserId) -> bool {
        self.game.player_for_user(user_id).is_some()
    }
}

/// Storage for games.
///
/// `save` is a compare-and-swap on `version`: it fails with
/// `Conflict(OptimisticLock)` when the stored version is no longer
/// `expected_version`. Soft-deleted games behave as missing everywhere.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load(&self, id: GameId) -> Result<StoredGame, DomainError>;

    async fn create(&self, game: Game) -> Result<StoredGame, DomainError>;

    /// Insert under a caller-chosen id; `Conflict(OptimisticLock)` if taken.
    async fn insert_with_id(&self, id: GameId, game: Game) -> Result<StoredGame, DomainError>;

    async fn save(
        &self,
        stored: StoredGame,
        expected_version: u64,
    ) -> Result<StoredGame, DomainError>;

    /// Live games with `user_id` on the roster, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<StoredGame>, DomainError>;
}
