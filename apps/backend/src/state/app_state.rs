use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::games::GameService;
use crate::ws::hub::WsRegistry;

/// Shared resources handed to every handler.
#[derive(Clone)]
pub struct AppState {
    games: Arc<GameService>,
    ws_registry: Arc<WsRegistry>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(games: Arc<GameService>, ws_registry: Arc<WsRegistry>, config: AppConfig) -> Self {
        Self {
            games,
            ws_registry,
            config,
        }
    }

    pub fn games(&self) -> Arc<GameService> {
        self.games.clone()
    }

    pub fn ws_registry(&self) -> Arc<WsRegistry> {
        self.ws_registry.clone()
    }
}
