//! Session record and its persistence in the credential store

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::store::{CredentialStore, StoreError};

/// Key of the JSON session record
pub const AUTH_USER_KEY: &str = "authUser";
/// Bare token key kept for older front-ends
pub const LEGACY_TOKEN_KEY: &str = "token";
/// Bare role key kept for older front-ends
pub const LEGACY_ROLE_KEY: &str = "role";
/// Serialized cookie jar holding the refresh cookie between processes
pub const COOKIE_JAR_KEY: &str = "cookies";

/// Role granted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Employee,
    User,
}

impl Role {
    /// Interpret the role string of a login response.
    ///
    /// A missing role means `Employee`; anything unrecognised is `User`.
    pub fn from_server(role: Option<&str>) -> Self {
        match role.unwrap_or("Employee") {
            "Admin" => Self::Admin,
            "Employee" => Self::Employee,
            _ => Self::User,
        }
    }

    /// Whether this role may use a view restricted to `required`.
    /// Admins may use everything.
    pub fn permits(self, required: Self) -> bool {
        self == Self::Admin || self == required
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Employee => "Employee",
            Self::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user as persisted under [`AUTH_USER_KEY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Session persistence on top of a [`CredentialStore`]
///
/// Read failures are treated as "no session". Writes made on behalf of the
/// refresh protocol log and swallow storage errors.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "Failed to read stored credentials: {e}");
                None
            }
        }
    }

    /// Restore the persisted session, if a well-formed one exists
    pub fn load(&self) -> Option<Session> {
        let raw = self.read(AUTH_USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring malformed session record: {e}");
                None
            }
        }
    }

    /// Bearer token to attach to outgoing requests
    pub fn token(&self) -> Option<String> {
        let from_record = self
            .read(AUTH_USER_KEY)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .and_then(|record| record.get("token")?.as_str().map(str::to_owned));

        from_record
            .or_else(|| self.read(LEGACY_TOKEN_KEY))
            .filter(|token| !token.is_empty())
    }

    /// Persist a freshly logged-in session along with the legacy keys
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let record = serde_json::to_string(session)?;
        self.store.set(AUTH_USER_KEY, &record)?;
        self.store.set(LEGACY_TOKEN_KEY, &session.token)?;
        self.store.set(LEGACY_ROLE_KEY, session.role.as_str())?;
        Ok(())
    }

    /// Store a refreshed token.
    ///
    /// Merged into the session record when one exists, otherwise written as
    /// the bare legacy token.
    pub fn store_refreshed_token(&self, token: &str) {
        let record = self
            .read(AUTH_USER_KEY)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .filter(Value::is_object);

        let result = match record {
            Some(mut record) => {
                record["token"] = Value::String(token.to_string());
                self.store.set(AUTH_USER_KEY, &record.to_string())
            }
            None => self.store.set(LEGACY_TOKEN_KEY, token),
        };

        if let Err(e) = result {
            warn!("Failed to persist refreshed token: {e}");
        }
    }

    /// Serialized cookie jar, if one was persisted
    pub fn cookie_jar(&self) -> Option<String> {
        self.read(COOKIE_JAR_KEY)
    }

    pub fn save_cookie_jar(&self, jar: &str) {
        if let Err(e) = self.store.set(COOKIE_JAR_KEY, jar) {
            warn!("Failed to persist cookies: {e}");
        }
    }

    /// Remove every trace of the session
    pub fn clear(&self) {
        for key in [AUTH_USER_KEY, LEGACY_TOKEN_KEY, LEGACY_ROLE_KEY, COOKIE_JAR_KEY] {
            if let Err(e) = self.store.delete(key) {
                warn!(key, "Failed to clear stored credentials: {e}");
            }
        }
    }
}
