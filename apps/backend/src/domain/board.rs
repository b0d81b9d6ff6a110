//! Board layout and generation.

use std::collections::HashSet;
use std::iter;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::roster::Team;
use crate::domain::words::WordPool;
use crate::errors::domain::{DomainError, IntegrityKind, ValidationKind};

/// 5×5 grid, stored row-major as a flat list.
pub const BOARD_SIZE: usize = 25;
/// Tiles per team before the starting team's extra tile.
pub const TEAM_TILES: usize = 7;
pub const NEUTRAL_TILES: usize = 9;
pub const ASSASSIN_TILES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    A,
    B,
    Neutral,
    Assassin,
}

impl TileKind {
    pub fn team(self) -> Option<Team> {
        match self {
            TileKind::A => Some(Team::A),
            TileKind::B => Some(Team::B),
            TileKind::Neutral | TileKind::Assassin => None,
        }
    }
}

impl From<Team> for TileKind {
    fn from(team: Team) -> Self {
        match team {
            Team::A => TileKind::A,
            Team::B => TileKind::B,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub word: String,
    pub kind: TileKind,
    pub revealed: bool,
}

/// A validated board. Only `revealed` flags change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Rebuild a board from stored tiles, checking size, word uniqueness,
    /// and the 8/7/9/1 kind distribution.
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Self, DomainError> {
        if tiles.len() != BOARD_SIZE {
            return Err(corrupt(format!(
                "Board must have {BOARD_SIZE} tiles, found {}",
                tiles.len()
            )));
        }

        let mut words = HashSet::with_capacity(BOARD_SIZE);
        if let Some(dup) = tiles.iter().find(|t| !words.insert(t.word.as_str())) {
            return Err(corrupt(format!("Duplicate word on board: {}", dup.word)));
        }

        let count = |kind: TileKind| tiles.iter().filter(|t| t.kind == kind).count();
        let (a, b) = (count(TileKind::A), count(TileKind::B));
        let teams_ok =
            (a, b) == (TEAM_TILES + 1, TEAM_TILES) || (a, b) == (TEAM_TILES, TEAM_TILES + 1);
        if !teams_ok
            || count(TileKind::Neutral) != NEUTRAL_TILES
            || count(TileKind::Assassin) != ASSASSIN_TILES
        {
            return Err(corrupt(format!(
                "Invalid tile distribution: a={a} b={b} neutral={} assassin={}",
                count(TileKind::Neutral),
                count(TileKind::Assassin)
            )));
        }

        Ok(Self { tiles })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Marks a tile revealed and returns its kind. Callers check bounds and
    /// the revealed flag first.
    pub(crate) fn reveal(&mut self, index: usize) -> Option<TileKind> {
        let tile = self.tiles.get_mut(index)?;
        tile.revealed = true;
        Some(tile.kind)
    }
}

impl TryFrom<Vec<Tile>> for Board {
    type Error = DomainError;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        Board::from_tiles(tiles)
    }
}

impl From<Board> for Vec<Tile> {
    fn from(board: Board) -> Self {
        board.tiles
    }
}

fn corrupt(detail: String) -> DomainError {
    DomainError::integrity(IntegrityKind::CorruptBoard, detail)
}

/// Generate a fresh board.
///
/// Words are sampled without replacement; the starting team is a fair coin;
/// the kind multiset is shuffled separately, so layout and words are drawn
/// independently from `rng`.
pub fn generate<R: Rng + ?Sized>(pool: &WordPool, rng: &mut R) -> Result<Board, DomainError> {
    if pool.len() < BOARD_SIZE {
        return Err(DomainError::validation(
            ValidationKind::InsufficientWords,
            format!(
                "Word pool has {} words, at least {BOARD_SIZE} are required",
                pool.len()
            ),
        ));
    }

    let words: Vec<String> = index::sample(rng, pool.len(), BOARD_SIZE)
        .iter()
        .map(|i| pool.words()[i].clone())
        .collect();

    let starting_team = if rng.random_bool(0.5) { Team::A } else { Team::B };

    let mut kinds: Vec<TileKind> = iter::repeat_n(TileKind::A, TEAM_TILES)
        .chain(iter::repeat_n(TileKind::B, TEAM_TILES))
        .chain(iter::repeat_n(TileKind::Neutral, NEUTRAL_TILES))
        .chain(iter::repeat_n(TileKind::Assassin, ASSASSIN_TILES))
        .chain(iter::once(TileKind::from(starting_team)))
        .collect();
    kinds.shuffle(rng);

    let tiles = words
        .into_iter()
        .zip(kinds)
        .map(|(word, kind)| Tile {
            word,
            kind,
            revealed: false,
        })
        .collect();

    Board::from_tiles(tiles)
}
