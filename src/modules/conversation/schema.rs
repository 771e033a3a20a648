use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use uuid::Uuid;

use crate::constants;
use crate::modules::matches::schema::AcceptedBy;
use crate::modules::pet::schema::PetSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
}

/// What one participant sees about the *other* side of the match: the
/// counterpart's identity and pet. Keyed per participant on the
/// conversation's `user_match_details`, deliberately mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetails {
    pub partner_id: Uuid,
    pub partner_name: String,
    pub pet_id: Option<Uuid>,
    pub pet_name: String,
    pub pet_type: String,
    pub pet_breed: Option<String>,
    pub pet_photo_url: Option<String>,
}

impl MatchDetails {
    pub fn describing(partner_id: Uuid, partner_name: String, pet: &PetSnapshot) -> Self {
        MatchDetails {
            partner_id,
            partner_name,
            pet_id: pet.id,
            pet_name: pet.name.clone(),
            pet_type: pet._type.clone(),
            pet_breed: pet.breed.clone(),
            pet_photo_url: pet.photo_url.clone(),
        }
    }
}

/// The durable chat channel, created exactly once per accepted match and
/// stored under `conversations/{id}`.
///
/// `pet_info[user]` is that user's own pet; `user_match_details[user]`
/// describes the counterpart. The asymmetry is what each client renders as
/// "who you matched with".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntity {
    pub id: Uuid,
    pub participants: [Uuid; 2],
    pub status: ConversationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_message: String,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
    pub pet_info: HashMap<Uuid, PetSnapshot>,
    pub user_match_details: HashMap<Uuid, MatchDetails>,
    pub accepted_by: AcceptedBy,
}

impl ConversationEntity {
    pub fn involves(&self, user_id: &Uuid) -> bool {
        self.participants.contains(user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    System,
}

/// Author of a message. The store representation is a plain string: either
/// the `"system"` sentinel or a user id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageSender {
    System,
    User(Uuid),
}

impl Serialize for MessageSender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MessageSender::System => serializer.serialize_str(constants::SYSTEM_SENDER),
            MessageSender::User(user_id) => {
                serializer.serialize_str(&user_id.to_string())
            }
        }
    }
}

impl<'de> Deserialize<'de> for MessageSender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == constants::SYSTEM_SENDER {
            return Ok(MessageSender::System);
        }
        Uuid::parse_str(&raw)
            .map(MessageSender::User)
            .map_err(|_| de::Error::custom(format!("Invalid message sender: {}", raw)))
    }
}

/// A single chat entry, stored under `messages/{conversationId}/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntity {
    pub id: Uuid,
    pub sender_id: MessageSender,
    #[serde(rename = "type")]
    pub _type: MessageType,
    pub text: String,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_sender_serializes_to_sentinel() {
        let json = serde_json::to_string(&MessageSender::System).unwrap();
        assert_eq!(json, r#""system""#);
    }

    #[test]
    fn test_user_sender_roundtrips() {
        let user_id = Uuid::now_v7();
        let json = serde_json::to_string(&MessageSender::User(user_id)).unwrap();
        let back: MessageSender = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MessageSender::User(user_id));
    }

    #[test]
    fn test_sentinel_deserializes_to_system() {
        let sender: MessageSender = serde_json::from_str(r#""system""#).unwrap();
        assert_eq!(sender, MessageSender::System);
    }

    #[test]
    fn test_garbage_sender_is_rejected() {
        assert!(serde_json::from_str::<MessageSender>(r#""nobody""#).is_err());
    }

    #[test]
    fn test_conversation_map_keys_are_user_ids() {
        let (u1, u2) = (Uuid::now_v7(), Uuid::now_v7());
        let mut pet_info = HashMap::new();
        pet_info.insert(u1, PetSnapshot::placeholder());
        pet_info.insert(u2, PetSnapshot::placeholder());

        let conversation = ConversationEntity {
            id: Uuid::now_v7(),
            participants: [u1, u2],
            status: ConversationStatus::Active,
            created_at: chrono::Utc::now(),
            last_message: "hoş geldiniz".to_string(),
            last_message_at: chrono::Utc::now(),
            pet_info,
            user_match_details: HashMap::new(),
            accepted_by: AcceptedBy { user_id: u2, pet_id: None },
        };

        let value = serde_json::to_value(&conversation).unwrap();
        assert!(value["pet_info"][u1.to_string()].is_object());
        assert!(value["pet_info"][u2.to_string()].is_object());

        let back: ConversationEntity = serde_json::from_value(value).unwrap();
        assert!(back.involves(&u1) && back.involves(&u2));
    }
}
