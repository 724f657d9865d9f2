//! Client configuration

use serde::{Deserialize, Serialize};

/// Backend address used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:7240";

/// Connection settings for [`crate::ApiClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds (0 disables it)
    pub timeout_secs: u64,

    /// Upper bound on a token refresh call in seconds (0 disables it)
    pub refresh_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: Option<String>,

    /// Authentication endpoint paths
    pub auth: AuthPaths,
}

/// Paths of the authentication endpoints.
///
/// The backend exposes two generations of login and revoke endpoints:
/// `/api/User/Login` with `/api/auth/revoke` (the default), and
/// `/api/auth/login` with `/api/User/revoke`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPaths {
    pub login: String,
    pub refresh: String,
    pub revoke: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            refresh_timeout_secs: 10,
            user_agent: None,
            auth: AuthPaths::default(),
        }
    }
}

impl Default for AuthPaths {
    fn default() -> Self {
        Self {
            login: "/api/User/Login".to_string(),
            refresh: "/api/auth/refresh".to_string(),
            revoke: "/api/auth/revoke".to_string(),
        }
    }
}

impl AuthPaths {
    /// The `/api/auth/login` + `/api/User/revoke` endpoint generation
    pub fn legacy() -> Self {
        Self {
            login: "/api/auth/login".to_string(),
            refresh: "/api/auth/refresh".to_string(),
            revoke: "/api/User/revoke".to_string(),
        }
    }
}
