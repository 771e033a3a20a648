use serde_json::{Map, Value};
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::api::error;

pub mod memory;
pub mod redis;

/// A change observed at a store path.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub path: String,
    pub kind: StoreEventKind,
}

#[derive(Debug, Clone)]
pub enum StoreEventKind {
    /// The path now holds this value (created or updated).
    Put(Value),
    Removed,
}

/// Key-addressed hierarchical document store.
///
/// Paths are `/`-separated segments ("matches/{id}"). Each path operation is
/// independently atomic; there are no cross-path transactions. Reading a
/// branch path returns an object keyed by the child segments underneath it.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>, error::SystemError>;

    async fn set(&self, path: &str, value: Value) -> Result<(), error::SystemError>;

    /// Merges `fields` into the object stored at `path`, creating it if
    /// absent. Fields not named are left untouched.
    async fn update(
        &self,
        path: &str,
        fields: Map<String, Value>,
    ) -> Result<(), error::SystemError>;

    async fn remove(&self, path: &str) -> Result<(), error::SystemError>;

    /// Change feed for every path at or under `prefix`. The subscription is
    /// dropped when the receiver side is dropped.
    async fn subscribe(&self, prefix: &str) -> mpsc::UnboundedReceiver<StoreEvent>;
}

pub(crate) fn path_matches(prefix: &str, path: &str) -> bool {
    prefix.is_empty() || path == prefix || path.starts_with(&format!("{}/", prefix))
}

/// Tracks live `subscribe` callers for a store implementation and fans change
/// events out to those whose prefix covers the written path.
pub(crate) struct SubscriberRegistry {
    subscribers: Mutex<Vec<(String, mpsc::UnboundedSender<StoreEvent>)>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self { subscribers: Mutex::new(Vec::new()) }
    }

    pub fn add(&self, prefix: &str) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("subscriber registry lock poisoned")
            .push((prefix.trim_matches('/').to_string(), tx));
        rx
    }

    pub fn publish(&self, event: StoreEvent) {
        let mut subscribers =
            self.subscribers.lock().expect("subscriber registry lock poisoned");
        subscribers.retain(|(prefix, tx)| {
            if !path_matches(prefix, &event.path) {
                return !tx.is_closed();
            }
            tx.send(event.clone()).is_ok()
        });
    }
}

pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matches_exact_and_children() {
        assert!(path_matches("matches", "matches"));
        assert!(path_matches("matches", "matches/abc"));
        assert!(!path_matches("matches", "matchesx/abc"));
        assert!(!path_matches("matches/abc", "matches"));
        assert!(path_matches("", "anything/at/all"));
    }
}
