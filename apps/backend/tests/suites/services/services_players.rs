// Lobby roster management: join, assign, leave.

use codeword_backend::domain::roster::{Role, Team};
use codeword_backend::errors::domain::{
    AuthorizationKind, ConflictKind, DomainError, NotFoundKind, ValidationKind,
};
use codeword_test_support::unique_helpers::{unique_user, unique_users};
use uuid::Uuid;

use crate::support::build_test_state;
use crate::support::factory::{lobby_game, player_id, seated_lobby};

#[tokio::test]
async fn member_can_add_another_user() -> Result<(), DomainError> {
    let (state, _) = build_test_state();
    let service = state.games();
    let (creator, stored) = lobby_game(&service).await?;
    let friend = unique_user();

    let stored = service.join(stored.id, creator, friend, None).await?;

    let added = stored.game.player_for_user(friend).expect("friend joined");
    assert_eq!(added.team, None);
    assert_eq!(added.role, None);
    Ok(())
}

#[tokio::test]
async fn outsider_cannot_add_someone_else() -> Result<(), DomainError> {
    let (state, _) = build_test_state();
    let service = state.games();
    let (_, stored) = lobby_game(&service).await?;

    let err = service
        .join(stored.id, unique_user(), unique_user(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::NotAMember, _)
    ));
    Ok(())
}

#[tokio::test]
async fn join_twice_or_past_four_is_rejected() -> Result<(), DomainError> {
    let (state, _) = build_test_state();
    let service = state.games();
    let (creator, stored) = lobby_game(&service).await?;

    let err = service
        .join(stored.id, creator, creator, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::AlreadyJoined, _)
    ));

    for user in unique_users(3) {
        service.join(stored.id, user, user, None).await?;
    }
    let late = unique_user();
    let err = service.join(stored.id, late, late, None).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::GameFull, _)
    ));
    Ok(())
}

#[tokio::test]
async fn assign_is_partial_and_seats_are_unique() -> Result<(), DomainError> {
    let (state, _) = build_test_state();
    let service = state.games();
    let (creator, stored) = lobby_game(&service).await?;
    let friend = unique_user();
    let stored = service.join(stored.id, friend, friend, None).await?;
    let creator_pid = player_id(&stored, creator);
    let friend_pid = player_id(&stored, friend);

    let stored = service
        .assign(stored.id, creator, creator_pid, Some(Team::B), None, None)
        .await?;
    let stored = service
        .assign(stored.id, creator, creator_pid, None, Some(Role::Decoder), None)
        .await?;
    let me = stored.game.player(creator_pid).expect("creator still seated");
    assert_eq!(me.seat(), Some((Team::B, Role::Decoder)));

    let err = service
        .assign(
            stored.id,
            friend,
            friend_pid,
            Some(Team::B),
            Some(Role::Decoder),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::SeatTaken, _)));
    Ok(())
}

#[tokio::test]
async fn assign_unknown_player_is_not_found() -> Result<(), DomainError> {
    let (state, _) = build_test_state();
    let service = state.games();
    let (creator, stored) = lobby_game(&service).await?;

    let err = service
        .assign(stored.id, creator, Uuid::new_v4(), Some(Team::A), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Player, _)));
    Ok(())
}

#[tokio::test]
async fn leave_frees_the_seat() -> Result<(), DomainError> {
    let (state, _) = build_test_state();
    let service = state.games();
    let (table, stored) = seated_lobby(&service).await?;
    let leaver = table.user(Team::B, Role::Decoder);

    let stored = service
        .leave(table.game_id, leaver, player_id(&stored, leaver), None)
        .await?;
    assert_eq!(stored.game.players.len(), 3);
    assert!(!stored.has_user(leaver));

    let newcomer = unique_user();
    let stored = service
        .join(table.game_id, newcomer, newcomer, None)
        .await?;
    let stored = service
        .assign(
            table.game_id,
            newcomer,
            player_id(&stored, newcomer),
            Some(Team::B),
            Some(Role::Decoder),
            None,
        )
        .await?;
    assert!(stored.has_user(newcomer));
    Ok(())
}
