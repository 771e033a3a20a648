use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::WebSocketServer;

/// One actor per realtime connection. Identity is fixed at upgrade time; the
/// actor registers itself with the server on start and forwards outbound
/// messages to the client through an mpsc channel bridged in `handler.rs`.
pub struct WebSocketSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub server: Addr<WebSocketServer>,
    pub tx: mpsc::UnboundedSender<String>,
}

impl WebSocketSession {
    pub fn new(
        user_id: Uuid,
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self { id: Uuid::now_v7(), user_id, server, tx }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(err) = self.tx.send(json) {
                    tracing::error!(
                        "Failed to push message to client (session {}): {}",
                        self.id,
                        err
                    );
                }
            }
            Err(err) => {
                tracing::error!(
                    "Failed to serialize ServerMessage (session {}): {}",
                    self.id,
                    err
                );
            }
        }
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.server.do_send(Connect {
            id: self.id,
            user_id: self.user_id,
            addr: ctx.address(),
        });
        self.send_to_client(&ServerMessage::Connected { user_id: self.user_id });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.server.do_send(Disconnect { id: self.id });
    }
}

/// Outbound: server actor -> this session -> client channel.
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}

/// Inbound: parsed client frames from the transport task.
impl Handler<Inbound> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: Inbound, _: &mut Context<Self>) {
        match msg.0 {
            ClientMessage::Ping => self.send_to_client(&ServerMessage::Pong),
        }
    }
}

impl Handler<Stop> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, _: Stop, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}
