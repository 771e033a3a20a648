use std::sync::Arc;
use uuid::Uuid;

use crate::{
    constants,
    modules::user::{repository::UserProfileRepository, schema::UserProfile},
};

/// One source of a display name, tried in `CHAIN` order.
#[derive(Debug, Clone, Copy)]
enum NameSource {
    StructuredName,
    StoredDisplayName,
    /// A name the caller already holds (e.g. the one cached on the match
    /// record at creation time).
    CachedFallback,
}

const CHAIN: [NameSource; 3] = [
    NameSource::StructuredName,
    NameSource::StoredDisplayName,
    NameSource::CachedFallback,
];

/// Best-effort display name resolution. Never fails: profile read errors are
/// logged and treated as "not found", so identity resolution can never block
/// the match workflow.
#[derive(Clone)]
pub struct IdentityResolver<U>
where
    U: UserProfileRepository + Send + Sync,
{
    user_repo: Arc<U>,
}

impl<U> IdentityResolver<U>
where
    U: UserProfileRepository + Send + Sync,
{
    pub fn with_dependencies(user_repo: Arc<U>) -> Self {
        IdentityResolver { user_repo }
    }

    pub async fn resolve(&self, user_id: Uuid, fallback_name: Option<&str>) -> String {
        let profile = match self.user_repo.find_by_id(&user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                log::warn!("Profile read failed for {}: {}", user_id, err);
                None
            }
        };

        for source in CHAIN {
            if let Some(name) = Self::from_source(source, profile.as_ref(), fallback_name) {
                return name;
            }
        }
        constants::UNKNOWN_USER_NAME.to_string()
    }

    fn from_source(
        source: NameSource,
        profile: Option<&UserProfile>,
        fallback_name: Option<&str>,
    ) -> Option<String> {
        match source {
            NameSource::StructuredName => profile.and_then(UserProfile::full_name),
            NameSource::StoredDisplayName => profile
                .and_then(|p| p.display_name.as_deref())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            NameSource::CachedFallback => fallback_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error;
    use crate::modules::user::repository_store::UserStoreRepository;
    use crate::store::{memory::MemoryStore, RecordStore};
    use serde_json::json;

    fn resolver(store: Arc<MemoryStore>) -> IdentityResolver<UserStoreRepository> {
        let store: Arc<dyn RecordStore> = store;
        IdentityResolver::with_dependencies(Arc::new(UserStoreRepository::new(store)))
    }

    #[tokio::test]
    async fn test_structured_name_wins() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::now_v7();
        store
            .set(
                &format!("users/{}", user),
                json!({"first_name": "Ayşe", "last_name": "Yılmaz", "display_name": "ayse42"}),
            )
            .await
            .unwrap();

        let name = resolver(store).resolve(user, Some("Cached")).await;
        assert_eq!(name, "Ayşe Yılmaz");
    }

    #[tokio::test]
    async fn test_display_name_when_structured_missing() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::now_v7();
        store
            .set(&format!("users/{}", user), json!({"display_name": "  ayse42  "}))
            .await
            .unwrap();

        let name = resolver(store).resolve(user, None).await;
        assert_eq!(name, "ayse42");
    }

    #[tokio::test]
    async fn test_cached_fallback_when_profile_missing() {
        let store = Arc::new(MemoryStore::new());
        let name = resolver(store).resolve(Uuid::now_v7(), Some("Mehmet")).await;
        assert_eq!(name, "Mehmet");
    }

    #[tokio::test]
    async fn test_generic_placeholder_when_everything_missing() {
        let store = Arc::new(MemoryStore::new());
        let name = resolver(store).resolve(Uuid::now_v7(), None).await;
        assert_eq!(name, "Kullanıcı");
    }

    /// Repository whose reads always fail, standing in for a store outage.
    struct FailingUserRepository;

    #[async_trait::async_trait]
    impl UserProfileRepository for FailingUserRepository {
        async fn find_by_id(
            &self,
            _user_id: &Uuid,
        ) -> Result<Option<UserProfile>, error::SystemError> {
            Err(error::SystemError::store("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_read_failure_degrades_instead_of_propagating() {
        let resolver = IdentityResolver::with_dependencies(Arc::new(FailingUserRepository));
        let name = resolver.resolve(Uuid::now_v7(), Some("Cached")).await;
        assert_eq!(name, "Cached");
    }
}
