use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::schema::{ConversationEntity, MessageEntity},
};

#[async_trait::async_trait]
pub trait ConversationRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    async fn find_by_participant(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationEntity>, error::SystemError>;

    async fn create(&self, entity: &ConversationEntity) -> Result<(), error::SystemError>;
}

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn create(
        &self,
        conversation_id: &Uuid,
        message: &MessageEntity,
    ) -> Result<(), error::SystemError>;

    /// Messages of a conversation, oldest first.
    async fn list_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;
}
