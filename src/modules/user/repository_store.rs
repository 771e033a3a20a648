use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{repository::UserProfileRepository, schema::UserProfile},
    store::RecordStore,
};

#[derive(Clone)]
pub struct UserStoreRepository {
    store: Arc<dyn RecordStore>,
}

impl UserStoreRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn user_path(user_id: &Uuid) -> String {
        format!("users/{}", user_id)
    }
}

#[async_trait::async_trait]
impl UserProfileRepository for UserStoreRepository {
    async fn find_by_id(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<UserProfile>, error::SystemError> {
        let value = self.store.get(&Self::user_path(user_id)).await?;
        match value {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
