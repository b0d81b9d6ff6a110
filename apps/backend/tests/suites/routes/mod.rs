pub mod handler_games;
pub mod healthcheck;
