//! In-memory `GameStore` backed by a `DashMap`.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{GameStore, StoredGame};
use crate::domain::engine::Game;
use crate::domain::roster::{GameId, UserId};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

#[derive(Debug, Default)]
pub struct MemoryGameStore {
    games: DashMap<GameId, StoredGame>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

fn game_not_found(id: GameId) -> DomainError {
    DomainError::not_found(NotFoundKind::Game, format!("Game {id} not found"))
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn load(&self, id: GameId) -> Result<StoredGame, DomainError> {
        self.games
            .get(&id)
            .filter(|stored| !stored.is_deleted())
            .map(|stored| stored.value().clone())
            .ok_or_else(|| game_not_found(id))
    }

    async fn create(&self, game: Game) -> Result<StoredGame, DomainError> {
        self.insert_with_id(Uuid::new_v4(), game).await
    }

    async fn insert_with_id(&self, id: GameId, game: Game) -> Result<StoredGame, DomainError> {
        match self.games.entry(id) {
            Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!("Game {id} already exists"),
            )),
            Entry::Vacant(slot) => {
                let stored = StoredGame::new(id, game, OffsetDateTime::now_utc());
                slot.insert(stored.clone());
                debug!(game_id = %id, "game inserted");
                Ok(stored)
            }
        }
    }

    async fn save(
        &self,
        stored: StoredGame,
        expected_version: u64,
    ) -> Result<StoredGame, DomainError> {
        let id = stored.id;
        // The shard write lock is held for the whole compare-and-swap.
        let mut current = self
            .games
            .get_mut(&id)
            .filter(|current| !current.is_deleted())
            .ok_or_else(|| game_not_found(id))?;

        if current.version != expected_version {
            return Err(DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Game {id} is at version {}, expected {expected_version}",
                    current.version
                ),
            ));
        }

        let next = StoredGame {
            version: current.version + 1,
            created_at: current.created_at,
            updated_at: OffsetDateTime::now_utc(),
            ..stored
        };
        *current = next.clone();
        debug!(game_id = %id, version = next.version, "game saved");
        Ok(next)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<StoredGame>, DomainError> {
        let mut games: Vec<StoredGame> = self
            .games
            .iter()
            .filter(|entry| !entry.is_deleted() && entry.has_user(user_id))
            .map(|entry| entry.value().clone())
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(games)
    }
}
