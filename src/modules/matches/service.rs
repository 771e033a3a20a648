use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        conversation::{
            repository::{ConversationRepository, MessageRepository},
            service::ConversationService,
        },
        matches::{
            feed::MatchFeed,
            model::{CreateMatchBody, MatchAction},
            repository::MatchRepository,
            schema::{MatchEntity, MatchStatus},
        },
        pet::{repository::PetRepository, schema::PetSnapshot},
        user::{repository::UserProfileRepository, resolver::IdentityResolver},
        websocket::notify::Notifier,
    },
};

/// Orchestrates the match lifecycle: creation, the accept/reject state
/// machine, deletion, and the conversation materialization that acceptance
/// triggers.
///
/// Writes during acceptance are strictly ordered (conversation, welcome
/// message, match update) and never compensated: a failure mid-way leaves a
/// bounded inconsistency (an orphaned conversation, or a still-pending
/// match) that a user-driven retry heals through the derived conversation
/// id. The store offers no cross-path transaction to do better with.
#[derive(Clone)]
pub struct MatchService<R, C, M, P, U>
where
    R: MatchRepository + Send + Sync,
    C: ConversationRepository + Send + Sync,
    M: MessageRepository + Send + Sync,
    P: PetRepository + Send + Sync,
    U: UserProfileRepository + Send + Sync,
{
    match_repo: Arc<R>,
    pet_repo: Arc<P>,
    user_repo: Arc<U>,
    identity_resolver: IdentityResolver<U>,
    conversation_service: ConversationService<C, M, P, U>,
    feed: Arc<MatchFeed>,
    notifier: Arc<dyn Notifier>,
}

impl<R, C, M, P, U> MatchService<R, C, M, P, U>
where
    R: MatchRepository + Send + Sync,
    C: ConversationRepository + Send + Sync,
    M: MessageRepository + Send + Sync,
    P: PetRepository + Send + Sync,
    U: UserProfileRepository + Send + Sync,
{
    pub fn with_dependencies(
        match_repo: Arc<R>,
        pet_repo: Arc<P>,
        user_repo: Arc<U>,
        identity_resolver: IdentityResolver<U>,
        conversation_service: ConversationService<C, M, P, U>,
        feed: Arc<MatchFeed>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        MatchService {
            match_repo,
            pet_repo,
            user_repo,
            identity_resolver,
            conversation_service,
            feed,
            notifier,
        }
    }

    pub async fn get_matches(&self, user_id: Uuid) -> Vec<MatchEntity> {
        self.feed.list_for_user(&user_id).await
    }

    /// The sending flow: a pending introduction anchored on one of the
    /// sender's pets. The pet snapshot and sender name are denormalized here
    /// and never re-synced.
    pub async fn create_match(
        &self,
        sender_id: Uuid,
        body: CreateMatchBody,
    ) -> Result<MatchEntity, error::SystemError> {
        if body.receiver_id == sender_id {
            return Err(error::SystemError::bad_request(
                "Cannot send a match request to yourself",
            ));
        }

        let (profile, pet) = tokio::try_join!(
            self.user_repo.find_by_id(&body.receiver_id),
            self.pet_repo.find_by_id(&sender_id, &body.pet_id),
        )?;

        if profile.is_none() {
            return Err(error::SystemError::not_found("Receiver user not found"));
        }
        let pet = pet.ok_or_else(|| error::SystemError::not_found("Pet not found"))?;

        let duplicate = self.match_repo.list_all().await?.into_iter().any(|m| {
            m.status == MatchStatus::Pending
                && m.involves(&sender_id)
                && m.involves(&body.receiver_id)
        });
        if duplicate {
            return Err(error::SystemError::bad_request(
                "A pending match between these users already exists",
            ));
        }

        let sender_name = self.identity_resolver.resolve(sender_id, None).await;
        let now = chrono::Utc::now();
        let entity = MatchEntity {
            id: Uuid::now_v7(),
            sender_id,
            receiver_id: body.receiver_id,
            pet_id: body.pet_id,
            sender_name,
            status: MatchStatus::Pending,
            message: body.message,
            pet_info: PetSnapshot::from_record(body.pet_id, &pet),
            conversation_id: None,
            accepted_by: None,
            created_at: now,
            updated_at: now,
        };

        self.match_repo.create(&entity).await?;
        self.feed.upsert(entity.clone()).await;

        Ok(entity)
    }

    /// Dispatches a user action on a pending match. Exactly one notification
    /// (success or failure) is emitted per invocation; on failure the match
    /// is unchanged from the caller's perspective, though the store may hold
    /// a partially-completed acceptance (see `accept`).
    pub async fn handle_match_action(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        action: MatchAction,
    ) -> Result<MatchEntity, error::SystemError> {
        let result = match action {
            MatchAction::Accept => self.accept(user_id, match_id).await,
            MatchAction::Reject => self.reject(user_id, match_id).await,
        };

        match &result {
            Ok(_) => {
                let text = match action {
                    MatchAction::Accept => "Eşleşme kabul edildi! Sohbet oluşturuldu.",
                    MatchAction::Reject => "Eşleşme isteği reddedildi.",
                };
                self.notifier.notify_success(user_id, text);
            }
            Err(err) => {
                log::error!("Match {} {} failed: {}", match_id, action.as_str(), err);
                self.notifier
                    .notify_failure(user_id, "Eşleşme işlemi başarısız oldu. Lütfen tekrar deneyin.");
            }
        }

        result
    }

    /// Unconditional removal from any status, by either participant. Never
    /// cascades to an already-created conversation.
    pub async fn delete_match(
        &self,
        user_id: Uuid,
        match_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let result = self.delete_inner(user_id, match_id).await;

        match &result {
            Ok(()) => self.notifier.notify_success(user_id, "Eşleşme silindi."),
            Err(err) => {
                log::error!("Match {} delete failed: {}", match_id, err);
                self.notifier
                    .notify_failure(user_id, "Eşleşme silinemedi. Lütfen tekrar deneyin.");
            }
        }

        result
    }

    async fn delete_inner(
        &self,
        user_id: Uuid,
        match_id: Uuid,
    ) -> Result<(), error::SystemError> {
        if let Some(entity) = self.feed.get(&match_id).await {
            if !entity.involves(&user_id) {
                return Err(error::SystemError::forbidden(
                    "Only a participant can delete a match",
                ));
            }
        }

        self.match_repo.delete(&match_id).await?;
        self.feed.remove(&match_id).await;
        Ok(())
    }

    async fn accept(
        &self,
        accepter_id: Uuid,
        match_id: Uuid,
    ) -> Result<MatchEntity, error::SystemError> {
        let entity = self
            .feed
            .get(&match_id)
            .await
            .ok_or_else(|| error::SystemError::not_found("Match not found"))?;

        if entity.receiver_id != accepter_id {
            return Err(error::SystemError::forbidden(
                "Only the receiver can respond to a match request",
            ));
        }

        match entity.status {
            MatchStatus::Pending => {}
            // Re-accepting an accepted match keeps its existing conversation.
            MatchStatus::Accepted => {
                log::info!(
                    "Match {} already accepted, keeping conversation {:?}",
                    match_id,
                    entity.conversation_id
                );
                return Ok(entity);
            }
            MatchStatus::Rejected => {
                return Err(error::SystemError::bad_request("Match is no longer pending"));
            }
        }

        let conversation =
            self.conversation_service.materialize_from_match(&entity, accepter_id).await?;

        // Only after the conversation and its welcome message are durable is
        // the match flipped. A failure here strands the conversation and
        // keeps the match pending; retrying re-links the same derived id.
        let accepted_by = conversation.accepted_by.clone();
        let updated_at = chrono::Utc::now();
        self.match_repo
            .mark_accepted(&match_id, &conversation.id, &accepted_by, updated_at)
            .await?;

        let mut updated = entity;
        updated.status = MatchStatus::Accepted;
        updated.conversation_id = Some(conversation.id);
        updated.accepted_by = Some(accepted_by);
        updated.updated_at = updated_at;
        self.feed.upsert(updated.clone()).await;

        Ok(updated)
    }

    async fn reject(
        &self,
        user_id: Uuid,
        match_id: Uuid,
    ) -> Result<MatchEntity, error::SystemError> {
        let entity = self
            .feed
            .get(&match_id)
            .await
            .ok_or_else(|| error::SystemError::not_found("Match not found"))?;

        if entity.receiver_id != user_id {
            return Err(error::SystemError::forbidden(
                "Only the receiver can respond to a match request",
            ));
        }

        if entity.status != MatchStatus::Pending {
            return Err(error::SystemError::bad_request("Match is no longer pending"));
        }

        let updated_at = chrono::Utc::now();
        self.match_repo.mark_rejected(&match_id, updated_at).await?;

        let mut updated = entity;
        updated.status = MatchStatus::Rejected;
        updated.updated_at = updated_at;
        self.feed.upsert(updated.clone()).await;

        Ok(updated)
    }
}
