use actix::Addr;
use uuid::Uuid;

use super::events::SendToUser;
use super::message::{NoticeLevel, ServerMessage};
use super::server::WebSocketServer;

/// Fire-and-forget outcome notifications. Every user-initiated match action
/// ends in exactly one of these; the coordinator never consumes a return
/// value from the sink.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, user_id: Uuid, message: &str);
    fn notify_failure(&self, user_id: Uuid, message: &str);
}

/// Delivers notifications as toast events over the realtime channel, to
/// every connected device of the user.
pub struct WsNotifier {
    server: Addr<WebSocketServer>,
}

impl WsNotifier {
    pub fn new(server: Addr<WebSocketServer>) -> Self {
        Self { server }
    }

    fn push(&self, user_id: Uuid, level: NoticeLevel, message: &str) {
        self.server.do_send(SendToUser {
            user_id,
            message: ServerMessage::Notice { level, message: message.to_string() },
        });
    }
}

impl Notifier for WsNotifier {
    fn notify_success(&self, user_id: Uuid, message: &str) {
        self.push(user_id, NoticeLevel::Success, message);
    }

    fn notify_failure(&self, user_id: Uuid, message: &str) {
        self.push(user_id, NoticeLevel::Error, message);
    }
}
