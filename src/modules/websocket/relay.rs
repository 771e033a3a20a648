use actix::Addr;
use std::sync::Arc;
use uuid::Uuid;

use super::events::{BroadcastToAll, SendToUser};
use super::message::ServerMessage;
use super::server::WebSocketServer;
use crate::modules::matches::repository_store::MATCH_BRANCH;
use crate::modules::matches::schema::MatchEntity;
use crate::store::{RecordStore, StoreEventKind};

/// Bridges the store's match change feed onto the realtime channel, so open
/// clients re-render their lists reactively, independent of the outcome
/// notifications the coordinator sends.
///
/// Removal events do not carry the old record, so participants are unknown;
/// those fan out to all sessions and clients drop ids they do not hold.
pub async fn spawn_match_relay(store: Arc<dyn RecordStore>, server: Addr<WebSocketServer>) {
    let mut rx = store.subscribe(MATCH_BRANCH).await;

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let segments: Vec<&str> = event.path.split('/').collect();
            if segments.len() != 2 {
                continue;
            }
            let Ok(match_id) = Uuid::parse_str(segments[1]) else {
                continue;
            };

            match event.kind {
                StoreEventKind::Put(snapshot) => {
                    match serde_json::from_value::<MatchEntity>(snapshot.clone()) {
                        Ok(entity) => {
                            for user_id in [entity.sender_id, entity.receiver_id] {
                                server.do_send(SendToUser {
                                    user_id,
                                    message: ServerMessage::MatchChanged {
                                        match_id,
                                        snapshot: snapshot.clone(),
                                    },
                                });
                            }
                        }
                        Err(err) => {
                            tracing::warn!("Not relaying unreadable match {}: {}", match_id, err);
                        }
                    }
                }
                StoreEventKind::Removed => {
                    server.do_send(BroadcastToAll {
                        message: ServerMessage::MatchRemoved { match_id },
                    });
                }
            }
        }
    });
}
