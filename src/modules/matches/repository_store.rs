use serde_json::{json, Map};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::matches::{
        repository::MatchRepository,
        schema::{AcceptedBy, MatchEntity, MatchStatus},
    },
    store::RecordStore,
};

pub const MATCH_BRANCH: &str = "matches";

#[derive(Clone)]
pub struct MatchStoreRepository {
    store: Arc<dyn RecordStore>,
}

impl MatchStoreRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn match_path(match_id: &Uuid) -> String {
        format!("{}/{}", MATCH_BRANCH, match_id)
    }
}

#[async_trait::async_trait]
impl MatchRepository for MatchStoreRepository {
    async fn find_by_id(
        &self,
        match_id: &Uuid,
    ) -> Result<Option<MatchEntity>, error::SystemError> {
        let value = self.store.get(&Self::match_path(match_id)).await?;
        match value {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<MatchEntity>, error::SystemError> {
        let Some(branch) = self.store.get(MATCH_BRANCH).await? else {
            return Ok(Vec::new());
        };
        let Some(children) = branch.as_object() else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::with_capacity(children.len());
        for (key, value) in children {
            match serde_json::from_value::<MatchEntity>(value.clone()) {
                Ok(entity) => matches.push(entity),
                Err(err) => log::warn!("Skipping unreadable match {}: {}", key, err),
            }
        }
        Ok(matches)
    }

    async fn create(&self, entity: &MatchEntity) -> Result<(), error::SystemError> {
        self.store
            .set(&Self::match_path(&entity.id), serde_json::to_value(entity)?)
            .await
    }

    async fn mark_accepted(
        &self,
        match_id: &Uuid,
        conversation_id: &Uuid,
        accepted_by: &AcceptedBy,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError> {
        let mut fields = Map::new();
        fields.insert("status".into(), serde_json::to_value(MatchStatus::Accepted)?);
        fields.insert("conversation_id".into(), json!(conversation_id));
        fields.insert("accepted_by".into(), serde_json::to_value(accepted_by)?);
        fields.insert("updated_at".into(), json!(updated_at));
        self.store.update(&Self::match_path(match_id), fields).await
    }

    async fn mark_rejected(
        &self,
        match_id: &Uuid,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError> {
        let mut fields = Map::new();
        fields.insert("status".into(), serde_json::to_value(MatchStatus::Rejected)?);
        fields.insert("updated_at".into(), json!(updated_at));
        self.store.update(&Self::match_path(match_id), fields).await
    }

    async fn delete(&self, match_id: &Uuid) -> Result<(), error::SystemError> {
        self.store.remove(&Self::match_path(match_id)).await
    }
}
