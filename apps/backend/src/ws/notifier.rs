//! Per-player fan-out after each successful save.

use std::sync::Arc;

use tracing::debug;

use crate::domain::player_view::view_for;
use crate::store::StoredGame;
use crate::ws::hub::WsRegistry;
use crate::ws::session::HubEvent;

/// Delivery is fire-and-forget; implementations never fail the caller.
pub trait Notifier: Send + Sync {
    fn game_updated(&self, stored: &StoredGame);
}

pub struct WsNotifier {
    registry: Arc<WsRegistry>,
}

impl WsNotifier {
    pub fn new(registry: Arc<WsRegistry>) -> Self {
        Self { registry }
    }
}

impl Notifier for WsNotifier {
    fn game_updated(&self, stored: &StoredGame) {
        for player in &stored.game.players {
            let view = view_for(stored.id, stored.version, &stored.game, player.user_id);
            let delivered = self
                .registry
                .send_to_user(player.user_id, HubEvent::GameState(Box::new(view)));
            debug!(
                game_id = %stored.id,
                user_id = %player.user_id,
                version = stored.version,
                delivered,
                "game state pushed"
            );
        }
    }
}
