pub struct Env {
    pub redis_url: String,
    pub store_backend: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        // "redis" or "memory" (local development / tests)
        let store_backend =
            std::env::var("STORE_BACKEND").unwrap_or_else(|_| "redis".to_string());

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        Env { redis_url, store_backend, frontend_url, ip, port }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender sentinel carried by system-authored messages.
pub const SYSTEM_SENDER: &str = "system";

// Placeholder snapshot substituted when no real pet can be resolved.
pub const UNKNOWN_PET_NAME: &str = "Bilinmeyen Hayvan";
pub const UNKNOWN_PET_TYPE: &str = "other";
pub const UNKNOWN_PET_PHOTO: &str = "/assets/pet-placeholder.png";

/// Display name used when identity resolution exhausts every fallback.
pub const UNKNOWN_USER_NAME: &str = "Kullanıcı";

/// Welcome text written as the first message of every materialized
/// conversation.
pub fn welcome_message(sender_name: &str, accepter_name: &str) -> String {
    format!(
        "{} ile {} eşleşti! Artık sohbet edebilirsiniz. 🐾",
        sender_name, accepter_name
    )
}
