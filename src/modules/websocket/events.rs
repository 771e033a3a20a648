//! Messages exchanged between the session actors and the server actor.

use actix::prelude::*;
use uuid::Uuid;

use super::message::{ClientMessage, ServerMessage};
use super::session::WebSocketSession;

/// A session connected. Identity is known at connect time (the gateway
/// authenticated the upgrade request), so registration and user binding
/// happen in one step.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub user_id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

/// Deliver a message to every session of one user (multi-device).
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct SendToUser {
    pub user_id: Uuid,
    pub message: ServerMessage,
}

/// Deliver a message to every connected session.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToAll {
    pub message: ServerMessage,
}

/// A parsed client frame, forwarded from the transport task to its session
/// actor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Inbound(pub ClientMessage);

/// The transport closed; the session actor stops and deregisters itself.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Stop;
