//! Login, logout and session restore

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::session::{Role, Session};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Body returned by the login endpoints
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub role: Option<String>,
    pub message: Option<String>,
}

impl ApiClient {
    /// Exchange credentials for a session and persist it.
    ///
    /// Login never goes through token refresh: a 401 here means the
    /// credentials were wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let request = self
            .request(Method::POST, self.auth_paths().login.as_str())
            .json(&LoginRequest { email, password })?;

        let response = Self::check(self.dispatch(&request, None).await?).await?;
        let bytes = response.bytes().await?;
        let body: LoginResponse = if bytes.iter().all(u8::is_ascii_whitespace) {
            LoginResponse::default()
        } else {
            serde_json::from_slice(&bytes)?
        };

        let Some(token) = body.token.filter(|token| !token.is_empty()) else {
            return Err(ClientError::LoginRejected(
                body.message
                    .unwrap_or_else(|| "Login failed: no token returned".to_string()),
            ));
        };

        let session = Session {
            username: email.to_string(),
            role: Role::from_server(body.role.as_deref()),
            token,
            email: Some(email.to_string()),
        };

        if let Err(e) = self.sessions().save(&session) {
            warn!("Failed to persist session: {e}");
        }
        info!(username = %session.username, role = %session.role, "Logged in");
        Ok(session)
    }

    /// Revoke the session remotely (best effort) and forget it locally
    pub async fn logout(&self) {
        let request = self.request(Method::POST, self.auth_paths().revoke.as_str());
        let token = self.sessions().token();

        match self.dispatch(&request, token.as_deref()).await {
            Ok(response) => {
                if let Err(e) = Self::check(response).await {
                    debug!("Token revocation rejected: {e}");
                }
            }
            Err(e) => debug!("Token revocation failed: {e}"),
        }

        self.forget_session();
        info!("Logged out");
    }

    /// Session restored from the credential store
    pub fn current_session(&self) -> Option<Session> {
        self.sessions().load()
    }

    /// The current session, provided its role grants `required`
    pub fn require_role(&self, required: Role) -> Result<Session, ClientError> {
        let session = self
            .current_session()
            .ok_or_else(|| ClientError::Unauthorized("not logged in".to_string()))?;
        if session.role.permits(required) {
            Ok(session)
        } else {
            Err(ClientError::Forbidden(format!(
                "{} role required, logged in as {}",
                required, session.role
            )))
        }
    }
}
