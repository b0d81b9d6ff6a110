//! Domain-level error type used across the engine, store, and services.
//!
//! This error type is HTTP-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError` through
//! `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Caller input that violates a rule of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    InvalidClue,
    InvalidNumber,
    NumberExceedsRemaining,
    NoSuchTile,
    AlreadyRevealed,
    InsufficientWords,
    GameFull,
}

/// Operation invalid for the game's current lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    GameNotStarted,
    GameAlreadyStarted,
    GameOver,
    GameNotCompleted,
    NotEnoughPlayers,
    IncompleteRoster,
}

/// The actor is not the party entitled to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationKind {
    WrongRole,
    NotYourTurn,
    NotAMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The stored game moved past the version the caller read.
    OptimisticLock,
    /// Another player already holds the requested (team, role) pair.
    SeatTaken,
    AlreadyJoined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Game,
    Player,
}

/// Invariants that `start` and `Board::from_tiles` are supposed to guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityKind {
    NoMatchingPlayer,
    CorruptBoard,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    Validation(ValidationKind, String),
    State(StateKind, String),
    Authorization(AuthorizationKind, String),
    Conflict(ConflictKind, String),
    NotFound(NotFoundKind, String),
    Integrity(IntegrityKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::State(kind, d) => write!(f, "state error {kind:?}: {d}"),
            DomainError::Authorization(kind, d) => write!(f, "authorization error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Integrity(kind, d) => write!(f, "integrity error {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn state(kind: StateKind, detail: impl Into<String>) -> Self {
        Self::State(kind, detail.into())
    }
    pub fn authorization(kind: AuthorizationKind, detail: impl Into<String>) -> Self {
        Self::Authorization(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn integrity(kind: IntegrityKind, detail: impl Into<String>) -> Self {
        Self::Integrity(kind, detail.into())
    }

    /// Only a lost optimistic-lock race may be retried by re-reading the game.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict(ConflictKind::OptimisticLock, _))
    }
}
