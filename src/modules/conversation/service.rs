use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    constants,
    modules::{
        conversation::{
            repository::{ConversationRepository, MessageRepository},
            schema::{
                ConversationEntity, ConversationStatus, MatchDetails, MessageEntity,
                MessageSender, MessageType,
            },
        },
        matches::schema::{AcceptedBy, MatchEntity},
        pet::{repository::PetRepository, resolver::PetResolver},
        user::{repository::UserProfileRepository, resolver::IdentityResolver},
    },
};

/// Namespace for deriving a conversation id from its match id. The
/// derivation makes re-running acceptance land on the same conversation
/// instead of materializing a duplicate.
const CONVERSATION_NAMESPACE: Uuid = Uuid::from_u128(0x8c2f_b1d4_7e5a_4c6b_9d3e_1f0a2b4c6d8e_u128);

pub fn conversation_id_for(match_id: &Uuid) -> Uuid {
    Uuid::new_v5(&CONVERSATION_NAMESPACE, match_id.as_bytes())
}

#[derive(Clone)]
pub struct ConversationService<C, M, P, U>
where
    C: ConversationRepository + Send + Sync,
    M: MessageRepository + Send + Sync,
    P: PetRepository + Send + Sync,
    U: UserProfileRepository + Send + Sync,
{
    conversation_repo: Arc<C>,
    message_repo: Arc<M>,
    pet_resolver: PetResolver<P, U>,
    identity_resolver: IdentityResolver<U>,
}

impl<C, M, P, U> ConversationService<C, M, P, U>
where
    C: ConversationRepository + Send + Sync,
    M: MessageRepository + Send + Sync,
    P: PetRepository + Send + Sync,
    U: UserProfileRepository + Send + Sync,
{
    pub fn with_dependencies(
        conversation_repo: Arc<C>,
        message_repo: Arc<M>,
        pet_resolver: PetResolver<P, U>,
        identity_resolver: IdentityResolver<U>,
    ) -> Self {
        ConversationService { conversation_repo, message_repo, pet_resolver, identity_resolver }
    }

    pub async fn get_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        self.conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))
    }

    pub async fn get_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationEntity>, error::SystemError> {
        self.conversation_repo.find_by_participant(&user_id).await
    }

    pub async fn get_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        self.message_repo.list_by_conversation(&conversation_id).await
    }

    /// Turns an accepted match into its durable conversation.
    ///
    /// The match never recorded which of the accepter's pets is involved, so
    /// the accepter side resolves with no preferred id. Writes are strictly
    /// ordered, conversation first and then its welcome message, so a reader
    /// that observes the match pointing here finds both.
    ///
    /// Re-entry after a partial failure short-circuits on the derived id:
    /// the existing conversation is returned (and its welcome message is
    /// backfilled if that write was the one that failed).
    pub async fn materialize_from_match(
        &self,
        entity: &MatchEntity,
        accepter_id: Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        let conversation_id = conversation_id_for(&entity.id);

        if let Some(existing) = self.conversation_repo.find_by_id(&conversation_id).await? {
            log::info!(
                "Conversation {} already materialized for match {}",
                conversation_id,
                entity.id
            );
            if self.message_repo.list_by_conversation(&conversation_id).await?.is_empty() {
                self.write_welcome(&conversation_id, existing.last_message.clone()).await?;
            }
            return Ok(existing);
        }

        let sender_pet =
            self.pet_resolver.resolve(entity.sender_id, Some(entity.pet_id)).await;
        let accepter_pet = self.pet_resolver.resolve(accepter_id, None).await;

        let sender_name = self
            .identity_resolver
            .resolve(entity.sender_id, Some(&entity.sender_name))
            .await;
        let accepter_name = self.identity_resolver.resolve(accepter_id, None).await;

        let welcome = constants::welcome_message(&sender_name, &accepter_name);
        let now = chrono::Utc::now();

        let mut pet_info = HashMap::new();
        pet_info.insert(entity.sender_id, sender_pet.clone());
        pet_info.insert(entity.receiver_id, accepter_pet.clone());

        // Mirrored on purpose: each participant's entry describes the other
        // side's pet and identity.
        let mut user_match_details = HashMap::new();
        user_match_details.insert(
            entity.sender_id,
            MatchDetails::describing(entity.receiver_id, accepter_name, &accepter_pet),
        );
        user_match_details.insert(
            entity.receiver_id,
            MatchDetails::describing(entity.sender_id, sender_name, &sender_pet),
        );

        let conversation = ConversationEntity {
            id: conversation_id,
            participants: [entity.sender_id, entity.receiver_id],
            status: ConversationStatus::Active,
            created_at: now,
            last_message: welcome.clone(),
            last_message_at: now,
            pet_info,
            user_match_details,
            accepted_by: AcceptedBy { user_id: accepter_id, pet_id: accepter_pet.id },
        };

        self.conversation_repo.create(&conversation).await?;
        self.write_welcome(&conversation_id, welcome).await?;

        Ok(conversation)
    }

    async fn write_welcome(
        &self,
        conversation_id: &Uuid,
        text: String,
    ) -> Result<(), error::SystemError> {
        let message = MessageEntity {
            id: Uuid::now_v7(),
            sender_id: MessageSender::System,
            _type: MessageType::System,
            text,
            read: false,
            created_at: chrono::Utc::now(),
        };
        self.message_repo.create(conversation_id, &message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::conversation::repository_store::{
        ConversationStoreRepository, MessageStoreRepository,
    };
    use crate::modules::matches::schema::MatchStatus;
    use crate::modules::pet::repository_store::PetStoreRepository;
    use crate::modules::pet::schema::PetSnapshot;
    use crate::modules::user::repository_store::UserStoreRepository;
    use crate::store::{memory::MemoryStore, RecordStore};
    use serde_json::json;

    type Service = ConversationService<
        ConversationStoreRepository,
        MessageStoreRepository,
        PetStoreRepository,
        UserStoreRepository,
    >;

    fn service(store: &Arc<MemoryStore>) -> Service {
        let store: Arc<dyn RecordStore> = store.clone();
        let pet_repo = Arc::new(PetStoreRepository::new(store.clone()));
        let user_repo = Arc::new(UserStoreRepository::new(store.clone()));
        ConversationService::with_dependencies(
            Arc::new(ConversationStoreRepository::new(store.clone())),
            Arc::new(MessageStoreRepository::new(store)),
            PetResolver::with_dependencies(pet_repo, user_repo.clone()),
            IdentityResolver::with_dependencies(user_repo),
        )
    }

    fn pending_match(sender_id: Uuid, receiver_id: Uuid, pet_id: Uuid) -> MatchEntity {
        MatchEntity {
            id: Uuid::now_v7(),
            sender_id,
            receiver_id,
            pet_id,
            sender_name: "Ayşe".to_string(),
            status: MatchStatus::Pending,
            message: Some("Merhaba!".to_string()),
            pet_info: PetSnapshot::placeholder(),
            conversation_id: None,
            accepted_by: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_materialize_builds_mirrored_details() {
        let store = Arc::new(MemoryStore::new());
        let (sender, receiver) = (Uuid::now_v7(), Uuid::now_v7());
        let (sender_pet, receiver_pet) = (Uuid::now_v7(), Uuid::now_v7());
        store
            .set(&format!("pets/{}/{}", sender, sender_pet), json!({"name": "Rex", "type": "dog"}))
            .await
            .unwrap();
        store
            .set(
                &format!("pets/{}/{}", receiver, receiver_pet),
                json!({"name": "Mia", "type": "cat"}),
            )
            .await
            .unwrap();
        store
            .set(
                &format!("users/{}", receiver),
                json!({"first_name": "Mehmet", "last_name": "Demir"}),
            )
            .await
            .unwrap();

        let entity = pending_match(sender, receiver, sender_pet);
        let conversation =
            service(&store).materialize_from_match(&entity, receiver).await.unwrap();

        assert_eq!(conversation.pet_info[&sender].name, "Rex");
        assert_eq!(conversation.pet_info[&receiver].name, "Mia");
        // each side's details describe the other participant
        assert_eq!(conversation.user_match_details[&sender].pet_name, "Mia");
        assert_eq!(conversation.user_match_details[&sender].partner_name, "Mehmet Demir");
        assert_eq!(conversation.user_match_details[&receiver].pet_name, "Rex");
        assert_eq!(conversation.user_match_details[&receiver].partner_id, sender);
        assert_eq!(conversation.accepted_by.user_id, receiver);
        assert_eq!(conversation.accepted_by.pet_id, Some(receiver_pet));
    }

    #[tokio::test]
    async fn test_welcome_message_is_system_authored_and_unread() {
        let store = Arc::new(MemoryStore::new());
        let (sender, receiver) = (Uuid::now_v7(), Uuid::now_v7());
        let entity = pending_match(sender, receiver, Uuid::now_v7());

        let svc = service(&store);
        let conversation = svc.materialize_from_match(&entity, receiver).await.unwrap();

        let messages = svc.get_messages(conversation.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender_id, MessageSender::System);
        assert_eq!(messages[0]._type, MessageType::System);
        assert!(!messages[0].read);
        assert_eq!(messages[0].text, conversation.last_message);
        // the cached sender name feeds the template when no profile exists
        assert!(messages[0].text.contains("Ayşe"));
    }

    #[tokio::test]
    async fn test_rematerialize_is_a_noop_on_the_same_id() {
        let store = Arc::new(MemoryStore::new());
        let (sender, receiver) = (Uuid::now_v7(), Uuid::now_v7());
        let entity = pending_match(sender, receiver, Uuid::now_v7());

        let svc = service(&store);
        let first = svc.materialize_from_match(&entity, receiver).await.unwrap();
        let second = svc.materialize_from_match(&entity, receiver).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.id, conversation_id_for(&entity.id));
        assert_eq!(svc.get_messages(first.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conversations_listed_for_participants_only() {
        let store = Arc::new(MemoryStore::new());
        let (sender, receiver, stranger) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let entity = pending_match(sender, receiver, Uuid::now_v7());

        let svc = service(&store);
        svc.materialize_from_match(&entity, receiver).await.unwrap();

        assert_eq!(svc.get_by_user_id(sender).await.unwrap().len(), 1);
        assert_eq!(svc.get_by_user_id(receiver).await.unwrap().len(), 1);
        assert!(svc.get_by_user_id(stranger).await.unwrap().is_empty());
    }
}
