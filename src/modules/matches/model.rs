use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchBody {
    pub receiver_id: Uuid,
    pub pet_id: Uuid,
    #[validate(length(max = 500, message = "Message is too long"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchAction {
    Accept,
    Reject,
}

impl MatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAction::Accept => "accept",
            MatchAction::Reject => "reject",
        }
    }
}
