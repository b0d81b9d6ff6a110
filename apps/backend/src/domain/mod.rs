//! Domain layer: pure game logic types and helpers.

pub mod board;
pub mod board_view;
pub mod engine;
pub mod player_view;
pub mod roster;
pub mod turns;
pub mod words;


// Re-exports for ergonomics
pub use board::{Board, Tile, TileKind};
pub use engine::{Game, GamePhase};
pub use player_view::PlayerGameView;
pub use roster::{GameId, Player, PlayerId, Role, Team, UserId};
pub use turns::Turn;
pub use words::WordPool;
