use uuid::Uuid;

use crate::{
    api::error,
    modules::matches::schema::{AcceptedBy, MatchEntity},
};

#[async_trait::async_trait]
pub trait MatchRepository {
    async fn find_by_id(
        &self,
        match_id: &Uuid,
    ) -> Result<Option<MatchEntity>, error::SystemError>;

    /// The whole match branch. The store has no server-side queries;
    /// callers filter client-side.
    async fn list_all(&self) -> Result<Vec<MatchEntity>, error::SystemError>;

    async fn create(&self, entity: &MatchEntity) -> Result<(), error::SystemError>;

    /// Partial-field write flipping a pending match to accepted and linking
    /// its conversation. Issued only after the conversation is durable.
    async fn mark_accepted(
        &self,
        match_id: &Uuid,
        conversation_id: &Uuid,
        accepted_by: &AcceptedBy,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError>;

    async fn mark_rejected(
        &self,
        match_id: &Uuid,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError>;

    async fn delete(&self, match_id: &Uuid) -> Result<(), error::SystemError>;
}
