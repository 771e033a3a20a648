use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        pet::{repository::PetRepository, schema::PetSnapshot},
        user::repository::UserProfileRepository,
    },
};

/// One step of the pet resolution chain. The chain is folded left to right
/// into the first snapshot it produces.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PetLookup {
    /// An explicitly requested pet id (the match's own `pet_id`).
    Preferred(Uuid),
    /// The `active_pet_id` pointer on the owner's profile.
    ActivePointer,
    /// Any pet found under the owner, in store-defined order.
    FirstAvailable,
}

/// Resolves the best-known pet for a user. Total: missing users, missing
/// pets, and store failures all degrade to the placeholder snapshot, because
/// the match workflow must complete even when upstream data has since been
/// deleted.
#[derive(Clone)]
pub struct PetResolver<P, U>
where
    P: PetRepository + Send + Sync,
    U: UserProfileRepository + Send + Sync,
{
    pet_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<P, U> PetResolver<P, U>
where
    P: PetRepository + Send + Sync,
    U: UserProfileRepository + Send + Sync,
{
    pub fn with_dependencies(pet_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        PetResolver { pet_repo, user_repo }
    }

    fn chain(preferred_pet_id: Option<Uuid>) -> Vec<PetLookup> {
        let mut chain = Vec::with_capacity(3);
        if let Some(pet_id) = preferred_pet_id {
            chain.push(PetLookup::Preferred(pet_id));
        }
        chain.push(PetLookup::ActivePointer);
        chain.push(PetLookup::FirstAvailable);
        chain
    }

    pub async fn resolve(&self, owner_id: Uuid, preferred_pet_id: Option<Uuid>) -> PetSnapshot {
        for lookup in Self::chain(preferred_pet_id) {
            match self.apply(owner_id, lookup).await {
                Ok(Some(snapshot)) => return snapshot,
                Ok(None) => {}
                Err(err) => {
                    log::warn!("Pet lookup {:?} failed for owner {}: {}", lookup, owner_id, err);
                }
            }
        }
        PetSnapshot::placeholder()
    }

    async fn apply(
        &self,
        owner_id: Uuid,
        lookup: PetLookup,
    ) -> Result<Option<PetSnapshot>, error::SystemError> {
        match lookup {
            PetLookup::Preferred(pet_id) => {
                let record = self.pet_repo.find_by_id(&owner_id, &pet_id).await?;
                Ok(record.map(|r| PetSnapshot::from_record(pet_id, &r)))
            }
            PetLookup::ActivePointer => {
                let Some(profile) = self.user_repo.find_by_id(&owner_id).await? else {
                    return Ok(None);
                };
                let Some(active_pet_id) = profile.active_pet_id else {
                    return Ok(None);
                };
                // The pointer may dangle after a pet deletion.
                let record = self.pet_repo.find_by_id(&owner_id, &active_pet_id).await?;
                Ok(record.map(|r| PetSnapshot::from_record(active_pet_id, &r)))
            }
            PetLookup::FirstAvailable => {
                let mut pets = self.pet_repo.list_by_owner(&owner_id).await?;
                let result = pets
                    .drain(..)
                    .next()
                    .map(|(pet_id, record)| PetSnapshot::from_record(pet_id, &record));
                Ok(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::pet::repository_store::PetStoreRepository;
    use crate::modules::user::repository_store::UserStoreRepository;
    use crate::store::{memory::MemoryStore, RecordStore};
    use serde_json::json;

    fn resolver(
        store: Arc<MemoryStore>,
    ) -> PetResolver<PetStoreRepository, UserStoreRepository> {
        let store: Arc<dyn RecordStore> = store;
        PetResolver::with_dependencies(
            Arc::new(PetStoreRepository::new(store.clone())),
            Arc::new(UserStoreRepository::new(store)),
        )
    }

    async fn seed_pet(store: &MemoryStore, owner: Uuid, pet: Uuid, name: &str) {
        store
            .set(&format!("pets/{}/{}", owner, pet), json!({"name": name, "type": "dog"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_exact_id_wins_over_active_pointer() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::now_v7();
        let (wanted, active) = (Uuid::now_v7(), Uuid::now_v7());
        seed_pet(&store, owner, wanted, "Rex").await;
        seed_pet(&store, owner, active, "Mia").await;
        store
            .set(&format!("users/{}", owner), json!({"active_pet_id": active}))
            .await
            .unwrap();

        let snapshot = resolver(store).resolve(owner, Some(wanted)).await;
        assert_eq!(snapshot.id, Some(wanted));
        assert_eq!(snapshot.name, "Rex");
    }

    #[tokio::test]
    async fn test_missing_preferred_falls_back_to_active_pointer() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::now_v7();
        let active = Uuid::now_v7();
        seed_pet(&store, owner, active, "Mia").await;
        store
            .set(&format!("users/{}", owner), json!({"active_pet_id": active}))
            .await
            .unwrap();

        let snapshot = resolver(store).resolve(owner, Some(Uuid::now_v7())).await;
        assert_eq!(snapshot.id, Some(active));
        assert_eq!(snapshot.name, "Mia");
    }

    #[tokio::test]
    async fn test_dangling_active_pointer_falls_back_to_first_pet() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::now_v7();
        let pet = Uuid::now_v7();
        seed_pet(&store, owner, pet, "Boncuk").await;
        store
            .set(&format!("users/{}", owner), json!({"active_pet_id": Uuid::now_v7()}))
            .await
            .unwrap();

        let snapshot = resolver(store).resolve(owner, None).await;
        assert_eq!(snapshot.id, Some(pet));
        assert_eq!(snapshot.name, "Boncuk");
    }

    #[tokio::test]
    async fn test_any_owned_pet_resolves_to_a_real_pet() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::now_v7();
        let (p1, p2) = (Uuid::now_v7(), Uuid::now_v7());
        seed_pet(&store, owner, p1, "Rex").await;
        seed_pet(&store, owner, p2, "Mia").await;

        let snapshot = resolver(store).resolve(owner, None).await;
        assert!(!snapshot.is_placeholder());
        assert!(snapshot.id == Some(p1) || snapshot.id == Some(p2));
    }

    #[tokio::test]
    async fn test_no_pets_resolves_to_placeholder() {
        let store = Arc::new(MemoryStore::new());
        let snapshot = resolver(store).resolve(Uuid::now_v7(), None).await;
        assert!(snapshot.is_placeholder());
        assert_eq!(snapshot.name, "Bilinmeyen Hayvan");
        assert_eq!(snapshot._type, "other");
    }
}
