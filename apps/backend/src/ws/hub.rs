use actix::prelude::*;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::roster::UserId;
use crate::ws::session::HubEvent;

/// Live socket connections, grouped by user.
#[derive(Default)]
pub struct WsRegistry {
    by_user: DashMap<UserId, DashMap<Uuid, Recipient<HubEvent>>>,
    owners: DashMap<Uuid, UserId>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_connection(
        &self,
        user_id: UserId,
        conn_id: Uuid,
        recipient: Recipient<HubEvent>,
    ) {
        self.by_user
            .entry(user_id)
            .or_default()
            .insert(conn_id, recipient);
        self.owners.insert(conn_id, user_id);
    }

    pub fn unregister_connection(&self, conn_id: Uuid) {
        let Some((_, user_id)) = self.owners.remove(&conn_id) else {
            return;
        };
        let now_empty = match self.by_user.get(&user_id) {
            Some(conns) => {
                conns.remove(&conn_id);
                conns.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.by_user.remove_if(&user_id, |_, conns| conns.is_empty());
        }
    }

    pub fn connections_for(&self, user_id: UserId) -> usize {
        self.by_user.get(&user_id).map_or(0, |conns| conns.len())
    }

    /// Best-effort fan-out to every connection of `user_id`. Returns how
    /// many connections accepted the event.
    pub fn send_to_user(&self, user_id: UserId, event: HubEvent) -> usize {
        let Some(conns) = self.by_user.get(&user_id) else {
            return 0;
        };
        let mut delivered = 0;
        for conn in conns.iter() {
            match conn.value().try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    debug!(
                        conn_id = %conn.key(),
                        user_id = %user_id,
                        error = %err,
                        "[WS HUB] delivery failed"
                    );
                }
            }
        }
        delivered
    }
}
