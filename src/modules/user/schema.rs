use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User profile as stored under `users/{userId}`. Every field is optional;
/// profiles written by older clients may carry only a subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub active_pet_id: Option<Uuid>,
    pub photo_url: Option<String>,
}

impl UserProfile {
    /// Structured name joined and trimmed, if either part is present.
    pub fn full_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let joined = format!("{} {}", first, last);
        let joined = joined.trim();
        if joined.is_empty() {
            None
        } else {
            Some(joined.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            first_name: None,
            last_name: None,
            display_name: None,
            active_pet_id: None,
            photo_url: None,
        }
    }

    #[test]
    fn test_full_name_joins_and_trims() {
        let mut p = profile();
        p.first_name = Some("  Ayşe ".to_string());
        p.last_name = Some(" Yılmaz ".to_string());
        assert_eq!(p.full_name().as_deref(), Some("Ayşe Yılmaz"));
    }

    #[test]
    fn test_full_name_with_single_part() {
        let mut p = profile();
        p.first_name = Some("Ayşe".to_string());
        assert_eq!(p.full_name().as_deref(), Some("Ayşe"));
    }

    #[test]
    fn test_full_name_empty_is_none() {
        let mut p = profile();
        p.first_name = Some("   ".to_string());
        assert!(p.full_name().is_none());
    }
}
