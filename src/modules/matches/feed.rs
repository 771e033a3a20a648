use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    api::error,
    modules::matches::{repository_store::MATCH_BRANCH, schema::MatchEntity},
    store::{RecordStore, StoreEvent, StoreEventKind},
};

/// Live cache of the match branch, fed by the store's change subscription.
///
/// The workflow coordinator reads matches from here instead of issuing fresh
/// store reads, and the list view filters this cache client-side. The store
/// has no server-side queries.
pub struct MatchFeed {
    cache: RwLock<HashMap<Uuid, MatchEntity>>,
}

impl MatchFeed {
    /// Loads the current branch, then keeps the cache current from the
    /// change feed until the feed is dropped.
    pub async fn start(
        store: Arc<dyn RecordStore>,
    ) -> Result<Arc<Self>, error::SystemError> {
        let feed = Arc::new(MatchFeed { cache: RwLock::new(HashMap::new()) });

        if let Some(branch) = store.get(MATCH_BRANCH).await? {
            if let Some(children) = branch.as_object() {
                let mut cache = feed.cache.write().await;
                for (key, value) in children {
                    match serde_json::from_value::<MatchEntity>(value.clone()) {
                        Ok(entity) => {
                            cache.insert(entity.id, entity);
                        }
                        Err(err) => log::warn!("Skipping unreadable match {}: {}", key, err),
                    }
                }
            }
        }

        let mut rx = store.subscribe(MATCH_BRANCH).await;
        let weak = Arc::downgrade(&feed);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(feed) = weak.upgrade() else { break };
                feed.apply(event).await;
            }
        });

        Ok(feed)
    }

    /// Applies one change event. Only direct children of the match branch
    /// are entities; anything deeper is ignored.
    pub async fn apply(&self, event: StoreEvent) {
        let segments: Vec<&str> = event.path.split('/').collect();
        if segments.len() != 2 {
            return;
        }
        let Ok(match_id) = Uuid::parse_str(segments[1]) else {
            return;
        };

        match event.kind {
            StoreEventKind::Put(value) => match serde_json::from_value::<MatchEntity>(value) {
                Ok(entity) => {
                    self.cache.write().await.insert(match_id, entity);
                }
                Err(err) => log::warn!("Ignoring unreadable match event {}: {}", match_id, err),
            },
            StoreEventKind::Removed => {
                self.cache.write().await.remove(&match_id);
            }
        }
    }

    pub async fn get(&self, match_id: &Uuid) -> Option<MatchEntity> {
        self.cache.read().await.get(match_id).cloned()
    }

    /// Optimistic local update, ahead of the subscription confirming it.
    pub async fn upsert(&self, entity: MatchEntity) {
        self.cache.write().await.insert(entity.id, entity);
    }

    pub async fn remove(&self, match_id: &Uuid) {
        self.cache.write().await.remove(match_id);
    }

    pub async fn list_for_user(&self, user_id: &Uuid) -> Vec<MatchEntity> {
        let cache = self.cache.read().await;
        let mut matches: Vec<MatchEntity> =
            cache.values().filter(|m| m.involves(user_id)).cloned().collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::matches::schema::MatchStatus;
    use crate::modules::pet::schema::PetSnapshot;
    use serde_json::json;

    fn entity(sender_id: Uuid, receiver_id: Uuid) -> MatchEntity {
        MatchEntity {
            id: Uuid::now_v7(),
            sender_id,
            receiver_id,
            pet_id: Uuid::now_v7(),
            sender_name: "Ayşe".to_string(),
            status: MatchStatus::Pending,
            message: None,
            pet_info: PetSnapshot::placeholder(),
            conversation_id: None,
            accepted_by: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_start_loads_existing_branch() {
        let store = Arc::new(crate::store::memory::MemoryStore::new());
        let (u1, u2, u3) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let seeded = entity(u1, u2);
        store
            .set(
                &format!("{}/{}", MATCH_BRANCH, seeded.id),
                serde_json::to_value(&seeded).unwrap(),
            )
            .await
            .unwrap();

        let feed = MatchFeed::start(store).await.unwrap();
        assert!(feed.get(&seeded.id).await.is_some());
        assert_eq!(feed.list_for_user(&u1).await.len(), 1);
        assert_eq!(feed.list_for_user(&u2).await.len(), 1);
        assert!(feed.list_for_user(&u3).await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_put_and_remove_events() {
        let feed = MatchFeed { cache: RwLock::new(HashMap::new()) };
        let m = entity(Uuid::now_v7(), Uuid::now_v7());

        feed.apply(StoreEvent {
            path: format!("{}/{}", MATCH_BRANCH, m.id),
            kind: StoreEventKind::Put(serde_json::to_value(&m).unwrap()),
        })
        .await;
        assert!(feed.get(&m.id).await.is_some());

        feed.apply(StoreEvent {
            path: format!("{}/{}", MATCH_BRANCH, m.id),
            kind: StoreEventKind::Removed,
        })
        .await;
        assert!(feed.get(&m.id).await.is_none());
    }

    #[tokio::test]
    async fn test_deep_and_foreign_paths_are_ignored() {
        let feed = MatchFeed { cache: RwLock::new(HashMap::new()) };
        let m = entity(Uuid::now_v7(), Uuid::now_v7());

        feed.apply(StoreEvent {
            path: format!("{}/{}/extra", MATCH_BRANCH, m.id),
            kind: StoreEventKind::Put(json!({"status": "pending"})),
        })
        .await;
        feed.apply(StoreEvent {
            path: format!("{}/not-a-uuid", MATCH_BRANCH),
            kind: StoreEventKind::Put(json!({})),
        })
        .await;

        assert!(feed.list_for_user(&m.sender_id).await.is_empty());
    }
}
