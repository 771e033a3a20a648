use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::WebSocketSession;

/// Server actor managing all realtime sessions. Routes notification and
/// match-change events to the sessions of the affected users.
pub struct WebSocketServer {
    /// session_id -> session actor address
    sessions: HashMap<Uuid, Addr<WebSocketSession>>,

    /// user_id -> set of session_ids. A user may hold several sessions
    /// (phone, tablet, desktop).
    users: HashMap<Uuid, HashSet<Uuid>>,
}

impl WebSocketServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), users: HashMap::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }

    fn send_to_user(&self, user_id: &Uuid, message: ServerMessage) {
        if let Some(session_ids) = self.users.get(user_id) {
            for session_id in session_ids {
                self.send_to_session(session_id, message.clone());
            }
        }
    }
}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("Session {} connected for user {}", msg.id, msg.user_id);

        self.sessions.insert(msg.id, msg.addr);
        let sessions = self.users.entry(msg.user_id).or_default();
        sessions.insert(msg.id);

        tracing::info!(
            "User {} now has {} active session(s)",
            msg.user_id,
            sessions.len()
        );
    }
}

impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("Session {} disconnected", msg.id);

        self.sessions.remove(&msg.id);

        let mut user_to_remove: Option<Uuid> = None;
        for (&user_id, sessions) in self.users.iter_mut() {
            if sessions.remove(&msg.id) {
                if sessions.is_empty() {
                    user_to_remove = Some(user_id);
                }
                break;
            }
        }

        if let Some(user_id) = user_to_remove {
            self.users.remove(&user_id);
            tracing::info!("User {} fully disconnected (no more sessions)", user_id);
        }
    }
}

impl Handler<SendToUser> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: SendToUser, _: &mut Context<Self>) {
        if let Some(session_ids) = self.users.get(&msg.user_id) {
            let session_count = session_ids.len();
            for session_id in session_ids {
                self.send_to_session(session_id, msg.message.clone());
            }
            tracing::debug!("Sent message to user {} ({} sessions)", msg.user_id, session_count);
        } else {
            tracing::debug!("User {} not online, message not sent", msg.user_id);
        }
    }
}

impl Handler<BroadcastToAll> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: BroadcastToAll, _: &mut Context<Self>) {
        for session_addr in self.sessions.values() {
            session_addr.do_send(msg.message.clone());
        }

        tracing::debug!("Broadcast to all: {} sessions", self.sessions.len());
    }
}

/// Allows ServerMessage to be sent directly to session actors.
impl Message for ServerMessage {
    type Result = ();
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}
