//! What one user is allowed to see of a game.

use serde::{Deserialize, Serialize};

use crate::domain::board_view::{self, BoardDto};
use crate::domain::engine::{self, Game, GamePhase};
use crate::domain::roster::{GameId, Player, PlayerId, Role, Team, UserId};
use crate::domain::turns::Turn;

/// Per-viewer game state, as sent over HTTP and the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameView {
    pub game_id: GameId,
    pub version: u64,
    pub phase: GamePhase,
    pub board: BoardDto,
    pub turns: Vec<Turn>,
    pub active_player_id: Option<PlayerId>,
    pub started: bool,
    pub completed: bool,
    pub winner: Option<Team>,
    pub players: Vec<Player>,
    /// The viewer's own player id, if they are on the roster.
    pub you: Option<PlayerId>,
}

/// Only a transmitter of a started game sees unrevealed tile kinds.
pub fn board_redacted_for(game: &Game, viewer: Option<&Player>) -> bool {
    engine::phase(game) == GamePhase::Lobby
        || viewer.and_then(|p| p.role) != Some(Role::Transmitter)
}

pub fn view_for(game_id: GameId, version: u64, game: &Game, user_id: UserId) -> PlayerGameView {
    let viewer = game.player_for_user(user_id);
    let phase = engine::phase(game);
    PlayerGameView {
        game_id,
        version,
        phase,
        board: board_view::serialize(&game.board, board_redacted_for(game, viewer)),
        turns: game.turns.clone(),
        active_player_id: game.active_player_id,
        started: phase != GamePhase::Lobby,
        completed: phase == GamePhase::Completed,
        winner: engine::winner(game),
        players: game.players.clone(),
        you: viewer.map(|p| p.id),
    }
}
