use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Keep the connection alive.
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Connection registered for the authenticated user.
    #[serde(rename_all = "camelCase")]
    Connected { user_id: Uuid },

    /// Outcome toast for a user-initiated match action.
    #[serde(rename_all = "camelCase")]
    Notice { level: NoticeLevel, message: String },

    /// A match involving the receiver was written (created, accepted,
    /// rejected). Carries the full stored record.
    #[serde(rename_all = "camelCase")]
    MatchChanged {
        match_id: Uuid,
        snapshot: serde_json::Value,
    },

    /// A match was deleted. Clients drop it from their lists if present.
    #[serde(rename_all = "camelCase")]
    MatchRemoved { match_id: Uuid },

    /// Pong response to Ping.
    Pong,

    /// Something went wrong on this connection.
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}
