use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{
        repository::{ConversationRepository, MessageRepository},
        schema::{ConversationEntity, MessageEntity},
    },
    store::RecordStore,
};

const CONVERSATION_BRANCH: &str = "conversations";
const MESSAGE_BRANCH: &str = "messages";

#[derive(Clone)]
pub struct ConversationStoreRepository {
    store: Arc<dyn RecordStore>,
}

impl ConversationStoreRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn conversation_path(conversation_id: &Uuid) -> String {
        format!("{}/{}", CONVERSATION_BRANCH, conversation_id)
    }
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationStoreRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let value = self.store.get(&Self::conversation_path(conversation_id)).await?;
        match value {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn find_by_participant(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationEntity>, error::SystemError> {
        let Some(branch) = self.store.get(CONVERSATION_BRANCH).await? else {
            return Ok(Vec::new());
        };
        let Some(children) = branch.as_object() else {
            return Ok(Vec::new());
        };

        let mut conversations = Vec::new();
        for (key, value) in children {
            match serde_json::from_value::<ConversationEntity>(value.clone()) {
                Ok(entity) if entity.involves(user_id) => conversations.push(entity),
                Ok(_) => {}
                Err(err) => log::warn!("Skipping unreadable conversation {}: {}", key, err),
            }
        }
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(conversations)
    }

    async fn create(&self, entity: &ConversationEntity) -> Result<(), error::SystemError> {
        self.store
            .set(&Self::conversation_path(&entity.id), serde_json::to_value(entity)?)
            .await
    }
}

#[derive(Clone)]
pub struct MessageStoreRepository {
    store: Arc<dyn RecordStore>,
}

impl MessageStoreRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn message_path(conversation_id: &Uuid, message_id: &Uuid) -> String {
        format!("{}/{}/{}", MESSAGE_BRANCH, conversation_id, message_id)
    }

    fn conversation_path(conversation_id: &Uuid) -> String {
        format!("{}/{}", MESSAGE_BRANCH, conversation_id)
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageStoreRepository {
    async fn create(
        &self,
        conversation_id: &Uuid,
        message: &MessageEntity,
    ) -> Result<(), error::SystemError> {
        self.store
            .set(
                &Self::message_path(conversation_id, &message.id),
                serde_json::to_value(message)?,
            )
            .await
    }

    async fn list_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let Some(branch) = self.store.get(&Self::conversation_path(conversation_id)).await?
        else {
            return Ok(Vec::new());
        };
        let Some(children) = branch.as_object() else {
            return Ok(Vec::new());
        };

        let mut messages = Vec::with_capacity(children.len());
        for (key, value) in children {
            match serde_json::from_value::<MessageEntity>(value.clone()) {
                Ok(message) => messages.push(message),
                Err(err) => {
                    log::warn!(
                        "Skipping unreadable message {} in {}: {}",
                        key,
                        conversation_id,
                        err
                    );
                }
            }
        }
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}
