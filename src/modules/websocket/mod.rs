//! Realtime channel for the match workflow: outcome toasts and match-change
//! events pushed to every connected device of a user.
//!
//! - Message protocol (ClientMessage & ServerMessage)
//! - Server actor (tracks sessions per user)
//! - Session actor (one per connection)
//! - HTTP handler (upgrades the request and bridges frames)
//! - Notifier (the sink the workflow coordinator reports outcomes through)
//! - Relay (store change feed -> connected clients)
pub mod events;
pub mod handler;
pub mod message;
pub mod notify;
pub mod relay;
pub mod server;
pub mod session;
