use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;

/// Pet record as stored under `pets/{ownerId}/{petId}`. The record itself does
/// not carry its id; readers attach the path key.
///
/// The photo reference survived several schema generations in the mobile
/// clients, so it can live under any of three field names. `photo_reference`
/// checks them in priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub _type: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub photo_url: Option<String>,
    pub image_url: Option<String>,
    pub photo: Option<String>,
}

impl PetRecord {
    pub fn photo_reference(&self) -> Option<&str> {
        self.photo_url
            .as_deref()
            .or(self.image_url.as_deref())
            .or(self.photo.as_deref())
    }
}

/// Denormalized display attributes of a pet, embedded into Match and
/// Conversation records. `id` is absent for the placeholder snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetSnapshot {
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type")]
    pub _type: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub photo_url: Option<String>,
}

impl PetSnapshot {
    pub fn from_record(pet_id: Uuid, record: &PetRecord) -> Self {
        PetSnapshot {
            id: Some(pet_id),
            name: record.name.clone(),
            _type: record._type.clone(),
            breed: record.breed.clone(),
            age: record.age,
            gender: record.gender.clone(),
            photo_url: record.photo_reference().map(str::to_string),
        }
    }

    /// Substituted when no real pet can be resolved, so the workflow can
    /// complete despite missing upstream data.
    pub fn placeholder() -> Self {
        PetSnapshot {
            id: None,
            name: constants::UNKNOWN_PET_NAME.to_string(),
            _type: constants::UNKNOWN_PET_TYPE.to_string(),
            breed: None,
            age: None,
            gender: None,
            photo_url: Some(constants::UNKNOWN_PET_PHOTO.to_string()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PetRecord {
        PetRecord {
            name: "Rex".to_string(),
            _type: "dog".to_string(),
            breed: Some("Kangal".to_string()),
            age: Some(3),
            gender: Some("male".to_string()),
            photo_url: None,
            image_url: None,
            photo: None,
        }
    }

    #[test]
    fn test_photo_reference_priority_order() {
        let mut pet = record();
        pet.photo = Some("legacy.png".to_string());
        assert_eq!(pet.photo_reference(), Some("legacy.png"));

        pet.image_url = Some("mid.png".to_string());
        assert_eq!(pet.photo_reference(), Some("mid.png"));

        pet.photo_url = Some("current.png".to_string());
        assert_eq!(pet.photo_reference(), Some("current.png"));
    }

    #[test]
    fn test_record_deserializes_without_legacy_fields() {
        let pet: PetRecord =
            serde_json::from_str(r#"{"name":"Mia","type":"cat"}"#).unwrap();
        assert_eq!(pet.name, "Mia");
        assert_eq!(pet._type, "cat");
        assert!(pet.photo_reference().is_none());
    }

    #[test]
    fn test_placeholder_snapshot_shape() {
        let snapshot = PetSnapshot::placeholder();
        assert!(snapshot.is_placeholder());
        assert_eq!(snapshot.name, "Bilinmeyen Hayvan");
        assert_eq!(snapshot._type, "other");
    }
}
