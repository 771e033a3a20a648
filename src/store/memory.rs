use serde_json::{Map, Value};
use tokio::sync::{mpsc, RwLock};

use crate::api::error;
use crate::store::{
    split_path, RecordStore, StoreEvent, StoreEventKind, SubscriberRegistry,
};

/// In-process record store holding one JSON tree. Backs local development and
/// tests; semantics mirror the hosted store (branch reads return the subtree,
/// `update` merges fields, single-path writes only).
pub struct MemoryStore {
    root: RwLock<Value>,
    subscribers: SubscriberRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            subscribers: SubscriberRegistry::new(),
        }
    }

    fn lookup<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
        let mut current = root;
        for segment in segments {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }

    /// Walks to the object at `segments`, creating intermediate objects on the
    /// way down. Intermediate non-object values are replaced.
    fn lookup_object_mut<'a>(
        root: &'a mut Value,
        segments: &[&str],
    ) -> &'a mut Map<String, Value> {
        let mut current = root;
        for segment in segments {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let map = current.as_object_mut().expect("just coerced to an object");
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current.as_object_mut().expect("just coerced to an object")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, error::SystemError> {
        let root = self.root.read().await;
        Ok(Self::lookup(&root, &split_path(path)).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), error::SystemError> {
        let segments = split_path(path);
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| error::SystemError::store("Cannot set the store root"))?;

        {
            let mut root = self.root.write().await;
            let parent = Self::lookup_object_mut(&mut root, parents);
            parent.insert(last.to_string(), value.clone());
        }

        self.subscribers.publish(StoreEvent {
            path: segments.join("/"),
            kind: StoreEventKind::Put(value),
        });
        Ok(())
    }

    async fn update(
        &self,
        path: &str,
        fields: Map<String, Value>,
    ) -> Result<(), error::SystemError> {
        let segments = split_path(path);
        if segments.is_empty() {
            return Err(error::SystemError::store("Cannot update the store root"));
        }

        let merged = {
            let mut root = self.root.write().await;
            let target = Self::lookup_object_mut(&mut root, &segments);
            for (key, value) in fields {
                target.insert(key, value);
            }
            Value::Object(target.clone())
        };

        self.subscribers.publish(StoreEvent {
            path: segments.join("/"),
            kind: StoreEventKind::Put(merged),
        });
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), error::SystemError> {
        let segments = split_path(path);
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| error::SystemError::store("Cannot remove the store root"))?;

        let removed = {
            let mut root = self.root.write().await;
            match Self::lookup(&root, parents).map(Value::is_object) {
                // Removing under a missing branch is a no-op.
                Some(true) => {
                    let parent = Self::lookup_object_mut(&mut root, parents);
                    parent.remove(*last).is_some()
                }
                _ => false,
            }
        };

        if removed {
            self.subscribers.publish(StoreEvent {
                path: segments.join("/"),
                kind: StoreEventKind::Removed,
            });
        }
        Ok(())
    }

    async fn subscribe(&self, prefix: &str) -> mpsc::UnboundedReceiver<StoreEvent> {
        self.subscribers.add(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_then_get_roundtrips() {
        let store = MemoryStore::new();
        store.set("users/u1", json!({"display_name": "Ayşe"})).await.unwrap();

        let value = store.get("users/u1").await.unwrap().unwrap();
        assert_eq!(value["display_name"], "Ayşe");
    }

    #[tokio::test]
    async fn test_get_missing_path_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("users/nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_branch_get_returns_children() {
        let store = MemoryStore::new();
        store.set("pets/u1/p1", json!({"name": "Rex"})).await.unwrap();
        store.set("pets/u1/p2", json!({"name": "Mia"})).await.unwrap();

        let branch = store.get("pets/u1").await.unwrap().unwrap();
        let children = branch.as_object().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children["p1"]["name"], "Rex");
        assert_eq!(children["p2"]["name"], "Mia");
    }

    #[tokio::test]
    async fn test_update_merges_without_clobbering() {
        let store = MemoryStore::new();
        store.set("matches/m1", json!({"status": "pending", "message": "hi"})).await.unwrap();

        let mut fields = Map::new();
        fields.insert("status".into(), json!("rejected"));
        store.update("matches/m1", fields).await.unwrap();

        let value = store.get("matches/m1").await.unwrap().unwrap();
        assert_eq!(value["status"], "rejected");
        assert_eq!(value["message"], "hi");
    }

    #[tokio::test]
    async fn test_remove_deletes_and_tolerates_missing() {
        let store = MemoryStore::new();
        store.set("matches/m1", json!({"status": "pending"})).await.unwrap();

        store.remove("matches/m1").await.unwrap();
        assert!(store.get("matches/m1").await.unwrap().is_none());

        // removing again must not error
        store.remove("matches/m1").await.unwrap();
    }

    #[tokio::test]
    async fn test_subscribe_sees_writes_under_prefix_only() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe("matches").await;

        store.set("users/u1", json!({"display_name": "x"})).await.unwrap();
        store.set("matches/m1", json!({"status": "pending"})).await.unwrap();
        store.remove("matches/m1").await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.path, "matches/m1");
        assert!(matches!(first.kind, StoreEventKind::Put(_)));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.path, "matches/m1");
        assert!(matches!(second.kind, StoreEventKind::Removed));
    }

    #[tokio::test]
    async fn test_update_event_carries_merged_value() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe("matches").await;
        store.set("matches/m1", json!({"status": "pending", "message": "hi"})).await.unwrap();

        let mut fields = Map::new();
        fields.insert("status".into(), json!("accepted"));
        store.update("matches/m1", fields).await.unwrap();

        rx.recv().await.unwrap();
        let event = rx.recv().await.unwrap();
        match event.kind {
            StoreEventKind::Put(value) => {
                assert_eq!(value["status"], "accepted");
                assert_eq!(value["message"], "hi");
            }
            StoreEventKind::Removed => panic!("Expected a Put event"),
        }
    }
}
