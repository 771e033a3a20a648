use uuid::Uuid;

use crate::{api::error, modules::pet::schema::PetRecord};

#[async_trait::async_trait]
pub trait PetRepository {
    async fn find_by_id(
        &self,
        owner_id: &Uuid,
        pet_id: &Uuid,
    ) -> Result<Option<PetRecord>, error::SystemError>;

    /// All pets under an owner, keyed by id. Iteration order is
    /// store-defined; callers must not depend on it.
    async fn list_by_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<(Uuid, PetRecord)>, error::SystemError>;
}
