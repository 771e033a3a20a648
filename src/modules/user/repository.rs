use uuid::Uuid;

use crate::{api::error, modules::user::schema::UserProfile};

#[async_trait::async_trait]
pub trait UserProfileRepository {
    async fn find_by_id(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<UserProfile>, error::SystemError>;
}
