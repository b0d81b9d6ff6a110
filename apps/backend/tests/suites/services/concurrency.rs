// Version races: retries without If-Match, immediate failure with it, and
// re-authorization against the state that won.

use std::sync::Arc;

use codeword_backend::domain::engine;
use codeword_backend::domain::roster::Role;
use codeword_backend::domain::Turn;
use codeword_backend::errors::domain::{AuthorizationKind, ConflictKind, DomainError};
use codeword_backend::store::StoredGame;
use codeword_test_support::unique_helpers::unique_users;
use time::OffsetDateTime;

use crate::support::factory::{play_to_win, started_game, starting_team};
use crate::support::stores::{FlakyStore, InterleavingStore};
use crate::support::test_state::build_test_state_with_store;

const RETRIES: u32 = codeword_backend::config::DEFAULT_CONFLICT_RETRIES;

#[tokio::test]
async fn lost_races_within_budget_are_retried() -> Result<(), DomainError> {
    let store = FlakyStore::new();
    let (state, notifier) = build_test_state_with_store(store.clone());
    let service = state.games();
    let (table, stored) = started_game(&service).await?;
    let team = starting_team(&stored);
    notifier.clear();

    store.fail_next(RETRIES);
    let saved = service
        .give_clue(table.game_id, table.user(team, Role::Transmitter), "ocean", 1, None)
        .await?;

    assert_eq!(store.saves_attempted(), RETRIES + 1);
    assert_eq!(saved.version, stored.version + 1);
    assert_eq!(saved.game.turns.len(), 1);
    assert_eq!(notifier.events(), vec![(table.game_id, saved.version)]);
    Ok(())
}

#[tokio::test]
async fn lost_races_beyond_budget_surface_conflict() -> Result<(), DomainError> {
    let store = FlakyStore::new();
    let (state, notifier) = build_test_state_with_store(store.clone());
    let service = state.games();
    let (table, stored) = started_game(&service).await?;
    let team = starting_team(&stored);
    notifier.clear();

    store.fail_next(RETRIES + 1);
    let err = service
        .give_clue(table.game_id, table.user(team, Role::Transmitter), "ocean", 1, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::OptimisticLock, _)
    ));
    assert_eq!(store.saves_attempted(), RETRIES + 1);
    assert!(notifier.events().is_empty());
    assert_eq!(service.show(table.game_id, table.creator()).await?, stored);
    Ok(())
}

#[tokio::test]
async fn pinned_version_is_never_retried() -> Result<(), DomainError> {
    let store = FlakyStore::new();
    let (state, _) = build_test_state_with_store(store.clone());
    let service = state.games();
    let (table, stored) = started_game(&service).await?;
    let team = starting_team(&stored);

    store.fail_next(1);
    let err = service
        .give_clue(
            table.game_id,
            table.user(team, Role::Transmitter),
            "ocean",
            1,
            Some(stored.version),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::OptimisticLock, _)
    ));
    assert_eq!(store.saves_attempted(), 1);
    Ok(())
}

#[tokio::test]
async fn retry_reauthorizes_against_winning_state() -> Result<(), DomainError> {
    let store = InterleavingStore::new();
    let (state, _) = build_test_state_with_store(store.clone());
    let service = state.games();
    let (table, stored) = started_game(&service).await?;
    let team = starting_team(&stored);
    let transmitter = table.user(team, Role::Transmitter);

    // Another request from the same transmitter lands first.
    let competing = engine::give_clue(&stored.game, "first", 1, OffsetDateTime::now_utc())?;
    store.before_next_save(StoredGame {
        game: competing,
        ..stored.clone()
    });

    let err = service
        .give_clue(table.game_id, transmitter, "second", 1, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::NotYourTurn, _)
    ));

    let current = service.show(table.game_id, table.creator()).await?;
    assert_eq!(current.version, stored.version + 1);
    match current.game.turns.as_slice() {
        [Turn::Clue { word, .. }] => assert_eq!(word, "first"),
        other => panic!("expected only the competing clue, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn rematch_race_leaves_one_live_rematch() -> Result<(), DomainError> {
    let store = InterleavingStore::new();
    let (state, _) = build_test_state_with_store(store.clone());
    let service = state.games();
    let (table, stored) = started_game(&service).await?;
    let finished = play_to_win(&service, &table, stored).await?;

    // An unrelated write bumps the original between insert and link.
    store.before_next_save(finished.clone());

    let rematch = service.rematch(table.game_id, table.creator()).await?;
    let original = service.show(table.game_id, table.creator()).await?;
    assert_eq!(original.rematch_id, Some(rematch.id));

    let listed: Vec<_> = service
        .list(table.creator())
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(listed.len(), 2, "orphaned rematch must not be listed");
    assert!(listed.contains(&rematch.id));
    assert!(listed.contains(&table.game_id));
    Ok(())
}

#[tokio::test]
async fn failed_orphan_cleanup_does_not_mask_the_race() -> Result<(), DomainError> {
    let store = InterleavingStore::new();
    let (state, _) = build_test_state_with_store(store.clone());
    let service = state.games();
    let (table, stored) = started_game(&service).await?;
    let finished = play_to_win(&service, &table, stored).await?;

    store.before_next_save(finished.clone());
    store.reject_deletes();

    let rematch = service.rematch(table.game_id, table.creator()).await?;
    let original = service.show(table.game_id, table.creator()).await?;
    assert_eq!(original.rematch_id, Some(rematch.id));
    // The undeletable orphan stays listed next to the linked rematch.
    assert_eq!(service.list(table.creator()).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn concurrent_joins_all_land() -> Result<(), DomainError> {
    let store = Arc::new(codeword_backend::MemoryGameStore::new());
    let (state, _) = build_test_state_with_store(store);
    let service = state.games();
    let users = unique_users(4);
    let created = service.create(users[0]).await?;

    let (a, b, c) = tokio::join!(
        service.join(created.id, users[1], users[1], None),
        service.join(created.id, users[2], users[2], None),
        service.join(created.id, users[3], users[3], None),
    );
    a?;
    b?;
    c?;

    let stored = service.show(created.id, users[0]).await?;
    assert_eq!(stored.version, 3);
    for user in &users {
        assert!(stored.has_user(*user));
    }
    Ok(())
}
