//! Game operations: load, authorize, apply one engine step, save, notify.

use std::sync::Arc;

use parking_lot::Mutex;
use rand_chacha::ChaCha20Rng;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::engine::{self, Game};
use crate::domain::roster::{GameId, Player, PlayerId, Role, Team, UserId};
use crate::domain::words::WordPool;
use crate::errors::domain::{AuthorizationKind, ConflictKind, DomainError};
use crate::store::{GameStore, StoredGame};
use crate::ws::notifier::Notifier;

pub struct GameService {
    store: Arc<dyn GameStore>,
    notifier: Arc<dyn Notifier>,
    words: Arc<WordPool>,
    rng: Mutex<ChaCha20Rng>,
    conflict_retries: u32,
}

impl GameService {
    pub fn new(
        store: Arc<dyn GameStore>,
        notifier: Arc<dyn Notifier>,
        words: Arc<WordPool>,
        rng: ChaCha20Rng,
        conflict_retries: u32,
    ) -> Self {
        Self {
            store,
            notifier,
            words,
            rng: Mutex::new(rng),
            conflict_retries,
        }
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<StoredGame>, DomainError> {
        self.store.list_for_user(user_id).await
    }

    /// Members only; outsiders get `NotAMember`.
    pub async fn show(&self, game_id: GameId, user_id: UserId) -> Result<StoredGame, DomainError> {
        let stored = self.store.load(game_id).await?;
        member(&stored.game, user_id)?;
        Ok(stored)
    }

    /// New lobby game with the creator as its only player.
    pub async fn create(&self, user_id: UserId) -> Result<StoredGame, DomainError> {
        let game = {
            let mut rng = self.rng.lock();
            engine::new_game(vec![Player::new(user_id)], &self.words, &mut *rng)?
        };
        let stored = self.store.create(game).await?;
        info!(game_id = %stored.id, user_id = %user_id, "game created");
        self.notifier.game_updated(&stored);
        Ok(stored)
    }

    pub async fn start(
        &self,
        game_id: GameId,
        user_id: UserId,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate(game_id, expected, "start", |game| {
            member(game, user_id)?;
            engine::start(game)
        })
        .await
    }

    pub async fn give_clue(
        &self,
        game_id: GameId,
        user_id: UserId,
        word: &str,
        number: u8,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate(game_id, expected, "give_clue", |game| {
            require_turn(game, user_id, Role::Transmitter)?;
            engine::give_clue(game, word, number, OffsetDateTime::now_utc())
        })
        .await
    }

    pub async fn make_guess(
        &self,
        game_id: GameId,
        user_id: UserId,
        tile: usize,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate(game_id, expected, "make_guess", |game| {
            require_turn(game, user_id, Role::Decoder)?;
            engine::make_guess(game, tile, OffsetDateTime::now_utc())
        })
        .await
    }

    pub async fn end_turn(
        &self,
        game_id: GameId,
        user_id: UserId,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate(game_id, expected, "end_turn", |game| {
            require_turn(game, user_id, Role::Decoder)?;
            engine::end_turn(game)
        })
        .await
    }

    /// Add `new_user` to the lobby. The actor is either that user or an
    /// existing member.
    pub async fn join(
        &self,
        game_id: GameId,
        user_id: UserId,
        new_user: UserId,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate(game_id, expected, "join", |game| {
            if user_id != new_user {
                member(game, user_id)?;
            }
            engine::join(game, new_user)
        })
        .await
    }

    pub async fn assign(
        &self,
        game_id: GameId,
        user_id: UserId,
        player_id: PlayerId,
        team: Option<Team>,
        role: Option<Role>,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate(game_id, expected, "assign", |game| {
            member(game, user_id)?;
            engine::assign(game, player_id, team, role)
        })
        .await
    }

    pub async fn leave(
        &self,
        game_id: GameId,
        user_id: UserId,
        player_id: PlayerId,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate(game_id, expected, "leave", |game| {
            member(game, user_id)?;
            engine::leave(game, player_id)
        })
        .await
    }

    /// Soft delete. The game disappears from every read afterwards.
    pub async fn destroy(
        &self,
        game_id: GameId,
        user_id: UserId,
        expected: Option<u64>,
    ) -> Result<StoredGame, DomainError> {
        self.mutate_record(game_id, expected, "destroy", |stored| {
            member(&stored.game, user_id)?;
            Ok(StoredGame {
                deleted_at: Some(OffsetDateTime::now_utc()),
                ..stored.clone()
            })
        })
        .await
    }

    /// At most one rematch per game: a repeated request returns the game
    /// created the first time.
    pub async fn rematch(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> Result<StoredGame, DomainError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let original = self.store.load(game_id).await?;
            member(&original.game, user_id)?;
            if let Some(existing) = original.rematch_id {
                debug!(game_id = %game_id, rematch_id = %existing, "rematch already exists");
                return self.store.load(existing).await;
            }

            let game = {
                let mut rng = self.rng.lock();
                engine::rematch(&original.game, &self.words, &mut *rng)?
            };
            let created = self.store.insert_with_id(Uuid::new_v4(), game).await?;

            let version = original.version;
            let linked = StoredGame {
                rematch_id: Some(created.id),
                ..original
            };
            match self.store.save(linked, version).await {
                Ok(saved) => {
                    info!(game_id = %game_id, rematch_id = %created.id, "rematch created");
                    self.notifier.game_updated(&saved);
                    self.notifier.game_updated(&created);
                    return Ok(created);
                }
                Err(err) => {
                    // Lost the race: drop the orphan before deciding what to do.
                    let orphan = StoredGame {
                        deleted_at: Some(OffsetDateTime::now_utc()),
                        ..created.clone()
                    };
                    if let Err(cleanup) = self.store.save(orphan, created.version).await {
                        warn!(
                            game_id = %game_id,
                            orphan_id = %created.id,
                            error = %cleanup,
                            "failed to discard orphaned rematch"
                        );
                    }
                    if !(err.is_retryable() && attempt <= self.conflict_retries) {
                        return Err(err);
                    }
                    warn!(game_id = %game_id, attempt, "rematch lost a version race, retrying");
                }
            }
        }
    }

    async fn mutate<F>(
        &self,
        game_id: GameId,
        expected: Option<u64>,
        op: &'static str,
        apply: F,
    ) -> Result<StoredGame, DomainError>
    where
        F: Fn(&Game) -> Result<Game, DomainError>,
    {
        self.mutate_record(game_id, expected, op, |stored| {
            Ok(StoredGame {
                game: apply(&stored.game)?,
                ..stored.clone()
            })
        })
        .await
    }

    /// Read-modify-write with compare-and-swap on the version.
    ///
    /// With `expected` set, a version mismatch fails immediately. Without it,
    /// a lost race re-reads and re-applies up to `conflict_retries` times, so
    /// authorization is always evaluated against the state being replaced.
    async fn mutate_record<F>(
        &self,
        game_id: GameId,
        expected: Option<u64>,
        op: &'static str,
        apply: F,
    ) -> Result<StoredGame, DomainError>
    where
        F: Fn(&StoredGame) -> Result<StoredGame, DomainError>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.store.load(game_id).await?;
            if let Some(expected) = expected {
                if current.version != expected {
                    return Err(DomainError::conflict(
                        ConflictKind::OptimisticLock,
                        format!(
                            "Game {game_id} is at version {}, expected {expected}",
                            current.version
                        ),
                    ));
                }
            }

            let next = apply(&current)?;
            match self.store.save(next, current.version).await {
                Ok(saved) => {
                    info!(
                        game_id = %game_id,
                        op,
                        version = saved.version,
                        "game updated"
                    );
                    if !saved.is_deleted() {
                        self.notifier.game_updated(&saved);
                    }
                    return Ok(saved);
                }
                Err(err)
                    if err.is_retryable()
                        && expected.is_none()
                        && attempt <= self.conflict_retries =>
                {
                    warn!(game_id = %game_id, op, attempt, "version race, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn member(game: &Game, user_id: UserId) -> Result<&Player, DomainError> {
    game.player_for_user(user_id).ok_or_else(|| {
        DomainError::authorization(
            AuthorizationKind::NotAMember,
            format!("User {user_id} is not in this game"),
        )
    })
}

/// The actor must hold `role` and be the active player.
fn require_turn(game: &Game, user_id: UserId, role: Role) -> Result<(), DomainError> {
    engine::ensure_in_progress(game)?;
    let player = member(game, user_id)?;
    if player.role != Some(role) {
        return Err(DomainError::authorization(
            AuthorizationKind::WrongRole,
            format!("Only a {role:?} may do that"),
        ));
    }
    if game.active_player_id != Some(player.id) {
        return Err(DomainError::authorization(
            AuthorizationKind::NotYourTurn,
            "It is not your turn",
        ));
    }
    Ok(())
}
