use deadpool_redis::redis::{cmd, AsyncCommands};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::api::error;
use crate::store::{RecordStore, StoreEvent, StoreEventKind, SubscriberRegistry};

const SCAN_COUNT: usize = 512;

/// Record store over a Redis pool. One JSON blob per path; branch reads
/// assemble children by key-prefix scan. `update` is read-merge-write, which
/// keeps the store contract honest: only single-path writes are atomic.
///
/// The change feed covers writes made through this process.
pub struct RedisStore {
    pool: deadpool_redis::Pool,
    subscribers: SubscriberRegistry,
}

impl RedisStore {
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        Self { pool, subscribers: SubscriberRegistry::new() }
    }

    async fn child_keys(
        &self,
        conn: &mut deadpool_redis::Connection,
        path: &str,
    ) -> Result<Vec<String>, error::SystemError> {
        let pattern = format!("{}/*", path);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(conn)
                .await?;
            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }
}

/// Inserts `value` into `root` at the relative `/`-separated key path,
/// creating intermediate objects.
fn insert_nested(root: &mut Map<String, Value>, relative: &str, value: Value) {
    let mut current = root;
    let mut segments = relative.split('/').filter(|s| !s.is_empty()).peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry.as_object_mut().expect("just coerced to an object");
    }
}

#[async_trait::async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, error::SystemError> {
        let mut conn = self.pool.get().await?;

        let raw: Option<Vec<u8>> = conn.get(path).await?;
        if let Some(bytes) = raw {
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        // Branch read: assemble the subtree from descendant keys.
        let prefix = format!("{}/", path);
        let mut assembled = Map::new();
        for key in self.child_keys(&mut conn, path).await? {
            let raw: Option<Vec<u8>> = conn.get(&key).await?;
            let Some(bytes) = raw else { continue };
            let relative = key.strip_prefix(&prefix).unwrap_or(&key);
            insert_nested(&mut assembled, relative, serde_json::from_slice(&bytes)?);
        }

        if assembled.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Value::Object(assembled)))
        }
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        let serialized = serde_json::to_vec(&value)?;
        conn.set::<_, _, ()>(path, serialized).await?;

        self.subscribers.publish(StoreEvent {
            path: path.to_string(),
            kind: StoreEventKind::Put(value),
        });
        Ok(())
    }

    async fn update(
        &self,
        path: &str,
        fields: Map<String, Value>,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;

        let raw: Option<Vec<u8>> = conn.get(path).await?;
        let mut merged = match raw {
            Some(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };
        for (key, value) in fields {
            merged.insert(key, value);
        }

        let merged = Value::Object(merged);
        let serialized = serde_json::to_vec(&merged)?;
        conn.set::<_, _, ()>(path, serialized).await?;

        self.subscribers.publish(StoreEvent {
            path: path.to_string(),
            kind: StoreEventKind::Put(merged),
        });
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;

        conn.del::<_, ()>(path).await?;
        for key in self.child_keys(&mut conn, path).await? {
            conn.del::<_, ()>(key).await?;
        }

        self.subscribers.publish(StoreEvent {
            path: path.to_string(),
            kind: StoreEventKind::Removed,
        });
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

    #[test]
    fn test_insert_nested_builds_subtree() {
        let mut root = Map::new();
        insert_nested(&mut root, "u1/p1", json!({"name": "Rex"}));
        insert_nested(&mut root, "u1/p2", json!({"name": "Mia"}));
        insert_nested(&mut root, "u2", json!({"name": "Boncuk"}));

        assert_eq!(root["u1"]["p1"]["name"], "Rex");
        assert_eq!(root["u1"]["p2"]["name"], "Mia");
        assert_eq!(root["u2"]["name"], "Boncuk");
    }
}
