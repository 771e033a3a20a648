use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::pet::{repository::PetRepository, schema::PetRecord},
    store::RecordStore,
};

#[derive(Clone)]
pub struct PetStoreRepository {
    store: Arc<dyn RecordStore>,
}

impl PetStoreRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn pet_path(owner_id: &Uuid, pet_id: &Uuid) -> String {
        format!("pets/{}/{}", owner_id, pet_id)
    }

    fn owner_path(owner_id: &Uuid) -> String {
        format!("pets/{}", owner_id)
    }
}

#[async_trait::async_trait]
impl PetRepository for PetStoreRepository {
    async fn find_by_id(
        &self,
        owner_id: &Uuid,
        pet_id: &Uuid,
    ) -> Result<Option<PetRecord>, error::SystemError> {
        let value = self.store.get(&Self::pet_path(owner_id, pet_id)).await?;
        match value {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn list_by_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<(Uuid, PetRecord)>, error::SystemError> {
        let Some(branch) = self.store.get(&Self::owner_path(owner_id)).await? else {
            return Ok(Vec::new());
        };
        let Some(children) = branch.as_object() else {
            return Ok(Vec::new());
        };

        let mut pets = Vec::with_capacity(children.len());
        for (key, value) in children {
            let Ok(pet_id) = Uuid::parse_str(key) else {
                log::warn!("Skipping pet with non-uuid key {} under {}", key, owner_id);
                continue;
            };
            match serde_json::from_value::<PetRecord>(value.clone()) {
                Ok(record) => pets.push((pet_id, record)),
                Err(err) => {
                    log::warn!("Skipping unreadable pet {} under {}: {}", key, owner_id, err);
                }
            }
        }
        Ok(pets)
    }
}
