//! Turn state machine.
//!
//! Every operation reads a `Game` and returns a new one. Nothing is written
//! back on error, so a failed call never leaves a partial turn behind.

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::board::{self, Board, TileKind, BOARD_SIZE};
use crate::domain::board_view;
use crate::domain::roster::{self, Player, PlayerId, Role, Team, UserId, MAX_PLAYERS};
use crate::domain::turns::Turn;
use crate::domain::words::WordPool;
use crate::errors::domain::{
    AuthorizationKind, ConflictKind, DomainError, IntegrityKind, NotFoundKind, StateKind,
    ValidationKind,
};

/// Largest count a clue may carry.
pub const MAX_CLUE_NUMBER: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub board: Board,
    pub turns: Vec<Turn>,
    pub players: Vec<Player>,
    pub active_player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Lobby,
    InProgress,
    Completed,
}

impl Game {
    /// A lobby game: empty turn log and no active player.
    pub fn new(board: Board, players: Vec<Player>) -> Self {
        Self {
            board,
            turns: Vec::new(),
            players,
            active_player_id: None,
        }
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_for_user(&self, user_id: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.active_player_id.and_then(|id| self.player(id))
    }
}

/// Create a lobby game with a freshly generated board.
pub fn new_game<R: Rng + ?Sized>(
    players: Vec<Player>,
    pool: &WordPool,
    rng: &mut R,
) -> Result<Game, DomainError> {
    if players.len() > MAX_PLAYERS {
        return Err(game_full());
    }
    Ok(Game::new(board::generate(pool, rng)?, players))
}

pub fn phase(game: &Game) -> GamePhase {
    if completed(game) {
        GamePhase::Completed
    } else if game.active_player_id.is_some() {
        GamePhase::InProgress
    } else {
        GamePhase::Lobby
    }
}

/// True once the last turn is `End`. Stays true since nothing appends after it.
pub fn completed(game: &Game) -> bool {
    game.turns.last().is_some_and(Turn::is_end)
}

pub fn winner(game: &Game) -> Option<Team> {
    match game.turns.last() {
        Some(Turn::End { winner, .. }) => Some(*winner),
        _ => None,
    }
}

/// Fails unless the game is in progress.
pub fn ensure_in_progress(game: &Game) -> Result<(), DomainError> {
    match phase(game) {
        GamePhase::InProgress => Ok(()),
        GamePhase::Lobby => Err(DomainError::state(
            StateKind::GameNotStarted,
            "Game has not started",
        )),
        GamePhase::Completed => Err(game_over()),
    }
}

/// Fails unless the game is still in the lobby.
pub fn ensure_lobby(game: &Game) -> Result<(), DomainError> {
    match phase(game) {
        GamePhase::Lobby => Ok(()),
        GamePhase::InProgress => Err(DomainError::state(
            StateKind::GameAlreadyStarted,
            "Game has already started",
        )),
        GamePhase::Completed => Err(game_over()),
    }
}

pub fn start(game: &Game) -> Result<Game, DomainError> {
    ensure_lobby(game)?;
    roster::validate_ready(&game.players)?;

    let team = board_view::starting_team(&game.board);
    let first = seat_holder(&game.players, team, Role::Transmitter)?;

    let mut next = game.clone();
    next.active_player_id = Some(first);
    Ok(next)
}

/// Boundary check for clue numbers that arrive as JSON numbers.
pub fn clue_number(raw: f64) -> Result<u8, DomainError> {
    if !raw.is_finite() || raw.fract() != 0.0 || raw < 1.0 || raw > f64::from(MAX_CLUE_NUMBER) {
        return Err(invalid_number(&raw.to_string()));
    }
    // Range checked above, so the cast is exact.
    Ok(raw as u8)
}

pub fn give_clue(
    game: &Game,
    word: &str,
    number: u8,
    at: OffsetDateTime,
) -> Result<Game, DomainError> {
    ensure_in_progress(game)?;
    let active = require_active(game, Role::Transmitter)?;
    let team = seated_team(active)?;

    if word.is_empty() || word.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(
            ValidationKind::InvalidClue,
            "Clue must be a single word",
        ));
    }
    if !(1..=MAX_CLUE_NUMBER).contains(&number) {
        return Err(invalid_number(&number.to_string()));
    }
    let left = board_view::remaining(&game.board, team);
    if usize::from(number) > left {
        return Err(DomainError::validation(
            ValidationKind::NumberExceedsRemaining,
            format!("Clue number {number} exceeds the {left} tiles your team has left"),
        ));
    }

    let mut next = game.clone();
    next.turns.push(Turn::Clue {
        timestamp: at,
        player_id: active.id,
        word: word.to_owned(),
        number,
    });
    advance_turn(&mut next)?;
    Ok(next)
}

pub fn make_guess(game: &Game, tile: usize, at: OffsetDateTime) -> Result<Game, DomainError> {
    ensure_in_progress(game)?;
    let active = require_active(game, Role::Decoder)?;
    let team = seated_team(active)?;

    let target = game.board.tile(tile).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::NoSuchTile,
            format!("Tile {tile} is outside the board (0..{BOARD_SIZE})"),
        )
    })?;
    if target.revealed {
        return Err(DomainError::validation(
            ValidationKind::AlreadyRevealed,
            format!("Tile {tile} is already revealed"),
        ));
    }
    let kind = target.kind;
    let correct = kind == TileKind::from(team);

    let mut next = game.clone();
    next.board.reveal(tile);
    next.turns.push(Turn::Guess {
        timestamp: at,
        player_id: active.id,
        tile,
        correct,
    });

    if kind == TileKind::Assassin {
        end_game(&mut next, team.other(), at);
    } else if board_view::won(&next.board) {
        let winner = if correct { team } else { team.other() };
        end_game(&mut next, winner, at);
    } else if !correct {
        advance_turn(&mut next)?;
    }
    Ok(next)
}

/// A decoder passes without guessing. No turn is recorded.
pub fn end_turn(game: &Game) -> Result<Game, DomainError> {
    ensure_in_progress(game)?;
    require_active(game, Role::Decoder)?;

    let mut next = game.clone();
    advance_turn(&mut next)?;
    Ok(next)
}

/// Transmitter hands to the decoder of the same team; decoder hands to the
/// transmitter of the other team.
fn advance_turn(game: &mut Game) -> Result<(), DomainError> {
    let active = active_or_missing(game)?;
    let team = seated_team(active)?;
    let next = match active.role {
        Some(Role::Transmitter) => seat_holder(&game.players, team, Role::Decoder)?,
        Some(Role::Decoder) => seat_holder(&game.players, team.other(), Role::Transmitter)?,
        None => return Err(unseated(active.id)),
    };
    game.active_player_id = Some(next);
    Ok(())
}

fn end_game(game: &mut Game, winner: Team, at: OffsetDateTime) {
    game.turns.push(Turn::End {
        timestamp: at,
        winner,
    });
}

/// A new lobby game for the same users with every team and role inverted.
pub fn rematch<R: Rng + ?Sized>(
    game: &Game,
    pool: &WordPool,
    rng: &mut R,
) -> Result<Game, DomainError> {
    if !completed(game) {
        return Err(DomainError::state(
            StateKind::GameNotCompleted,
            "Only a completed game can be rematched",
        ));
    }
    let players = game.players.iter().map(Player::flipped).collect();
    Ok(Game::new(board::generate(pool, rng)?, players))
}

/// Add `user_id` as an unassigned player.
pub fn join(game: &Game, user_id: UserId) -> Result<Game, DomainError> {
    ensure_lobby(game)?;
    if game.player_for_user(user_id).is_some() {
        return Err(DomainError::conflict(
            ConflictKind::AlreadyJoined,
            format!("User {user_id} is already in this game"),
        ));
    }
    if game.players.len() >= MAX_PLAYERS {
        return Err(game_full());
    }

    let mut next = game.clone();
    next.players.push(Player::new(user_id));
    Ok(next)
}

/// Partial seat update: `None` leaves that field as it was.
pub fn assign(
    game: &Game,
    player_id: PlayerId,
    team: Option<Team>,
    role: Option<Role>,
) -> Result<Game, DomainError> {
    ensure_lobby(game)?;
    let mut next = game.clone();
    let player = next
        .players
        .iter_mut()
        .find(|p| p.id == player_id)
        .ok_or_else(|| player_not_found(player_id))?;
    if team.is_some() {
        player.team = team;
    }
    if role.is_some() {
        player.role = role;
    }

    if let Some((team, role)) = player.seat() {
        let taken = next
            .players
            .iter()
            .any(|p| p.id != player_id && p.seat() == Some((team, role)));
        if taken {
            return Err(DomainError::conflict(
                ConflictKind::SeatTaken,
                format!("Team {team:?} already has a {role:?}"),
            ));
        }
    }
    Ok(next)
}

pub fn leave(game: &Game, player_id: PlayerId) -> Result<Game, DomainError> {
    ensure_lobby(game)?;
    if game.player(player_id).is_none() {
        return Err(player_not_found(player_id));
    }
    let mut next = game.clone();
    next.players.retain(|p| p.id != player_id);
    Ok(next)
}

fn require_active(game: &Game, role: Role) -> Result<&Player, DomainError> {
    let active = active_or_missing(game)?;
    if active.role != Some(role) {
        return Err(DomainError::authorization(
            AuthorizationKind::WrongRole,
            format!("Active player is not a {role:?}"),
        ));
    }
    Ok(active)
}

fn active_or_missing(game: &Game) -> Result<&Player, DomainError> {
    game.active_player().ok_or_else(|| {
        DomainError::integrity(
            IntegrityKind::NoMatchingPlayer,
            "Active player is not on the roster",
        )
    })
}

fn seat_holder(players: &[Player], team: Team, role: Role) -> Result<PlayerId, DomainError> {
    roster::find_seat(players, team, role)
        .map(|p| p.id)
        .ok_or_else(|| {
            DomainError::integrity(
                IntegrityKind::NoMatchingPlayer,
                format!("No {role:?} on team {team:?}"),
            )
        })
}

fn seated_team(player: &Player) -> Result<Team, DomainError> {
    player.team.ok_or_else(|| unseated(player.id))
}

fn unseated(player_id: PlayerId) -> DomainError {
    DomainError::integrity(
        IntegrityKind::NoMatchingPlayer,
        format!("Player {player_id} has no seat"),
    )
}

fn game_over() -> DomainError {
    DomainError::state(StateKind::GameOver, "Game is over")
}

fn game_full() -> DomainError {
    DomainError::validation(
        ValidationKind::GameFull,
        format!("Game already has {MAX_PLAYERS} players"),
    )
}

fn invalid_number(shown: &str) -> DomainError {
    DomainError::validation(
        ValidationKind::InvalidNumber,
        format!("Clue number must be a whole number from 1 to {MAX_CLUE_NUMBER}, got {shown}"),
    )
}

fn player_not_found(player_id: PlayerId) -> DomainError {
    DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not found"))
}
