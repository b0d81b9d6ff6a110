//! Read-only queries over a `Board`.

use serde::{Deserialize, Serialize};

use crate::domain::board::{Board, Tile, TileKind, TEAM_TILES};
use crate::domain::roster::Team;

/// Team tiles grouped by owner, in board order.
#[derive(Debug)]
pub struct TeamTiles<'a> {
    pub a: Vec<&'a Tile>,
    pub b: Vec<&'a Tile>,
}

impl<'a> TeamTiles<'a> {
    pub fn of(&self, team: Team) -> &[&'a Tile] {
        match team {
            Team::A => &self.a,
            Team::B => &self.b,
        }
    }
}

pub fn team_tiles(board: &Board) -> TeamTiles<'_> {
    let mut grouped = TeamTiles {
        a: Vec::with_capacity(TEAM_TILES + 1),
        b: Vec::with_capacity(TEAM_TILES + 1),
    };
    for tile in board.tiles() {
        match tile.kind {
            TileKind::A => grouped.a.push(tile),
            TileKind::B => grouped.b.push(tile),
            TileKind::Neutral | TileKind::Assassin => {}
        }
    }
    grouped
}

/// The team holding the extra tile. Derived from counts every time.
pub fn starting_team(board: &Board) -> Team {
    let tiles = team_tiles(board);
    if tiles.a.len() > tiles.b.len() {
        Team::A
    } else {
        Team::B
    }
}

/// Unrevealed tiles left for `team`.
pub fn remaining(board: &Board, team: Team) -> usize {
    board
        .tiles()
        .iter()
        .filter(|t| t.kind == TileKind::from(team) && !t.revealed)
        .count()
}

/// The first team (A before B) with all of its tiles revealed.
pub fn winning_team(board: &Board) -> Option<Team> {
    [Team::A, Team::B]
        .into_iter()
        .find(|&team| remaining(board, team) == 0)
}

pub fn won(board: &Board) -> bool {
    winning_team(board).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKindView {
    A,
    B,
    Neutral,
    Assassin,
    Redacted,
}

impl From<TileKind> for TileKindView {
    fn from(kind: TileKind) -> Self {
        match kind {
            TileKind::A => TileKindView::A,
            TileKind::B => TileKindView::B,
            TileKind::Neutral => TileKindView::Neutral,
            TileKind::Assassin => TileKindView::Assassin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDto {
    pub word: String,
    pub kind: TileKindView,
    pub revealed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardDto(pub Vec<TileDto>);

/// Wire form of a board. When `redacted`, unrevealed tiles hide their kind.
pub fn serialize(board: &Board, redacted: bool) -> BoardDto {
    BoardDto(
        board
            .tiles()
            .iter()
            .map(|tile| TileDto {
                word: tile.word.clone(),
                kind: if redacted && !tile.revealed {
                    TileKindView::Redacted
                } else {
                    tile.kind.into()
                },
                revealed: tile.revealed,
            })
            .collect(),
    )
}
