use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::pet::schema::PetSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

/// The accepting side of a match. `pet_id` is absent when the accepter's pet
/// resolved to the placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedBy {
    pub user_id: Uuid,
    pub pet_id: Option<Uuid>,
}

/// A proposed introduction between two users, anchored on one pet of the
/// sender. Stored under `matches/{id}`.
///
/// `pet_info` and `sender_name` are denormalized at creation time and never
/// re-synced; the live pet or profile may have changed or vanished since.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub pet_id: Uuid,
    pub sender_name: String,
    pub status: MatchStatus,
    pub message: Option<String>,
    pub pet_info: PetSnapshot,
    pub conversation_id: Option<Uuid>,
    pub accepted_by: Option<AcceptedBy>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MatchEntity {
    pub fn involves(&self, user_id: &Uuid) -> bool {
        self.sender_id == *user_id || self.receiver_id == *user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MatchStatus::Pending).unwrap(), r#""pending""#);
        assert_eq!(serde_json::to_string(&MatchStatus::Accepted).unwrap(), r#""accepted""#);
        assert_eq!(serde_json::to_string(&MatchStatus::Rejected).unwrap(), r#""rejected""#);
    }

    #[test]
    fn test_entity_roundtrips_without_acceptance_fields() {
        let json = serde_json::json!({
            "id": Uuid::now_v7(),
            "sender_id": Uuid::now_v7(),
            "receiver_id": Uuid::now_v7(),
            "pet_id": Uuid::now_v7(),
            "sender_name": "Ayşe",
            "status": "pending",
            "message": "Merhaba!",
            "pet_info": {"id": Uuid::now_v7(), "name": "Rex", "type": "dog"},
            "created_at": chrono::Utc::now(),
            "updated_at": chrono::Utc::now(),
        });
        let entity: MatchEntity = serde_json::from_value(json).unwrap();
        assert_eq!(entity.status, MatchStatus::Pending);
        assert!(entity.conversation_id.is_none());
        assert!(entity.accepted_by.is_none());
    }
}
