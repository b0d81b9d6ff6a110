//! Players, teams, roles, and the roster checks that gate `start`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::domain::{DomainError, StateKind};

pub type GameId = Uuid;
pub type PlayerId = Uuid;
pub type UserId = Uuid;

/// A full game has one transmitter and one decoder per team.
pub const MIN_PLAYERS: usize = 4;
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Transmitter,
    Decoder,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Transmitter => Role::Decoder,
            Role::Decoder => Role::Transmitter,
        }
    }
}

/// A user's seat in one game. Team and role stay unset until assigned in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: UserId,
    pub team: Option<Team>,
    pub role: Option<Role>,
}

impl Player {
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            team: None,
            role: None,
        }
    }

    pub fn seated(user_id: UserId, team: Team, role: Role) -> Self {
        Self {
            team: Some(team),
            role: Some(role),
            ..Self::new(user_id)
        }
    }

    /// The (team, role) pair, once both are assigned.
    pub fn seat(&self) -> Option<(Team, Role)> {
        Some((self.team?, self.role?))
    }

    pub fn is_assigned(&self) -> bool {
        self.seat().is_some()
    }

    /// Same user under a fresh player id, with team and role both inverted.
    pub fn flipped(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            team: self.team.map(Team::other),
            role: self.role.map(Role::other),
        }
    }
}

/// The player holding `(team, role)`, if any.
pub fn find_seat(players: &[Player], team: Team, role: Role) -> Option<&Player> {
    players
        .iter()
        .find(|p| p.team == Some(team) && p.role == Some(role))
}

/// Checks run by `start`: enough players, and every player fully assigned.
pub fn validate_ready(players: &[Player]) -> Result<(), DomainError> {
    if players.len() < MIN_PLAYERS {
        return Err(DomainError::state(
            StateKind::NotEnoughPlayers,
            format!(
                "At least {MIN_PLAYERS} players are required, found {}",
                players.len()
            ),
        ));
    }

    if let Some(unassigned) = players.iter().find(|p| !p.is_assigned()) {
        return Err(DomainError::state(
            StateKind::IncompleteRoster,
            format!("Player {} has no team or role", unassigned.id),
        ));
    }

    Ok(())
}
