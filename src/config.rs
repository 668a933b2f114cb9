//! Runtime configuration.
//!
//! There is no config file and no persisted state; everything comes from a
//! couple of environment variables with sensible defaults. The session id
//! is minted fresh per process, so restarting the client starts a new
//! conversation on the backend.

use uuid::Uuid;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default user id segment of the send endpoint.
pub const DEFAULT_USER_ID: &str = "user1";

/// Runtime configuration for one client process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL (`CONFAB_SERVER`).
    pub base_url: String,
    /// User id routed into the endpoint path (`CONFAB_USER`).
    pub user_id: String,
    /// Per-process session id, a fresh UUID v4.
    pub session_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            session_id: Uuid::new_v4().to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build configuration from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("CONFAB_SERVER") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        if let Ok(user) = std::env::var("CONFAB_USER") {
            if !user.is_empty() {
                config.user_id = user;
            }
        }
        config
    }

    /// Set the backend base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set the session id (tests; normal runs keep the generated UUID).
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.user_id, DEFAULT_USER_ID);
        // Session id parses back as a UUID.
        assert!(Uuid::parse_str(&config.session_id).is_ok());
    }

    #[test]
    fn test_each_process_gets_its_own_session() {
        assert_ne!(Config::new().session_id, Config::new().session_id);
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_base_url("http://example:1234")
            .with_user_id("alice")
            .with_session_id("sess-1");
        assert_eq!(config.base_url, "http://example:1234");
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.session_id, "sess-1");
    }
}
