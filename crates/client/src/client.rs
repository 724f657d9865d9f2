//! Authenticated API client
//!
//! Every request carries the stored bearer token. A 401 triggers one
//! coordinated token refresh after which the request is replayed exactly
//! once; concurrent 401s share that refresh instead of starting their own.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{AuthPaths, ClientConfig};
#[cfg(not(target_arch = "wasm32"))]
use crate::cookies::CookieJar;
use crate::error::ClientError;
use crate::refresh::{RefreshCoordinator, RefreshFailure, Ticket};
use crate::session::SessionStore;
use crate::store::{CredentialStore, MemoryStore};

/// Default bound on a token refresh call
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("staffdir-client/", env!("CARGO_PKG_VERSION"));

/// Called once the session has been terminated by a failed refresh
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Replayable description of an outgoing call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: Option<String>,
}

/// Staff directory API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    sessions: SessionStore,
    #[cfg(not(target_arch = "wasm32"))]
    cookies: CookieJar,
    refresh: RefreshCoordinator,
    refresh_timeout: Option<Duration>,
    auth_paths: AuthPaths,
    on_session_expired: Option<SessionExpiredHook>,
}

impl ApiClient {
    /// Create a client with default settings and an in-memory store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session persistence backing this client
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub(crate) const fn auth_paths(&self) -> &AuthPaths {
        &self.auth_paths
    }

    /// Whether a token refresh is currently outstanding
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// Start describing a request
    pub fn request(&self, method: Method, path: impl Into<String>) -> ApiRequest {
        ApiRequest::new(method, path)
    }

    /// Put a request on the wire once, with the given bearer token
    pub(crate) async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), url);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        #[cfg(target_arch = "wasm32")]
        {
            builder = builder.fetch_credentials_include();
        }

        let response = builder.send().await?;

        #[cfg(not(target_arch = "wasm32"))]
        if response.headers().contains_key(header::SET_COOKIE) {
            self.cookies.persist(&self.sessions);
        }

        Ok(response)
    }

    /// Forget the stored session and any cookies that came with it
    pub(crate) fn forget_session(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        self.cookies.clear();
        self.sessions.clear();
    }

    /// Turn a non-success response into an error
    pub(crate) async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.text().await {
            Ok(text) if !text.trim().is_empty() => text,
            _ => status.to_string(),
        };
        Err(ClientError::from_status(status, message))
    }

    /// Send a request, recovering once from an expired token
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let token = self.sessions.token();
        let response = self.dispatch(request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check(response).await;
        }

        debug!(method = %request.method, path = %request.path, "Request unauthorized, refreshing token");
        let token = self.refreshed_token().await?;

        // The replay is final: a second 401 surfaces as Unauthorized
        let response = self.dispatch(request, Some(&token)).await?;
        Self::check(response).await
    }

    /// Send a request whose response body may be empty
    pub async fn execute_value(&self, request: &ApiRequest) -> Result<Option<Value>, ClientError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice(&bytes) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            // Plain-text acknowledgements carry no record
            Err(_) => Ok(None),
        }
    }

    /// Send a request and discard the response body
    pub async fn execute_empty(&self, request: &ApiRequest) -> Result<(), ClientError> {
        self.send(request).await?;
        Ok(())
    }

    /// Obtain a fresh token, either by leading the refresh or by waiting on
    /// the one already in flight
    async fn refreshed_token(&self) -> Result<String, ClientError> {
        let guard = match self.refresh.join() {
            Ticket::Leader(guard) => guard,
            Ticket::Waiter(outcome) => {
                debug!("Token refresh already in flight, queueing request");
                return match outcome.await {
                    Ok(Ok(token)) => Ok(token),
                    Ok(Err(RefreshFailure::Rejected(reason))) => {
                        Err(ClientError::AuthExpired(reason))
                    }
                    Ok(Err(RefreshFailure::Abandoned)) | Err(_) => {
                        Err(ClientError::RefreshAbandoned)
                    }
                };
            }
        };

        match self.request_new_token().await {
            Ok(token) => {
                self.sessions.store_refreshed_token(&token);
                let released = guard.resolve(&Ok(token.clone()));
                info!(released, "Access token refreshed");
                Ok(token)
            }
            Err(reason) => {
                let released = guard.resolve(&Err(RefreshFailure::Rejected(reason.clone())));
                warn!(released, "Token refresh failed, ending session: {reason}");
                self.forget_session();
                if let Some(hook) = &self.on_session_expired {
                    hook();
                }
                Err(ClientError::AuthExpired(reason))
            }
        }
    }

    async fn request_new_token(&self) -> Result<String, String> {
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(limit) = self.refresh_timeout {
            return match tokio::time::timeout(limit, self.call_refresh()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(format!("token refresh timed out after {limit:?}")),
            };
        }

        self.call_refresh().await
    }

    /// The refresh call itself never enters the recovery path
    async fn call_refresh(&self) -> Result<String, String> {
        let request = ApiRequest::new(Method::POST, self.auth_paths.refresh.as_str());
        let token = self.sessions.token();

        let response = self
            .dispatch(&request, token.as_deref())
            .await
            .map_err(|e| e.to_string())?;
        let response = Self::check(response).await.map_err(|e| e.to_string())?;
        let body: RefreshResponse = response.json().await.map_err(|e| e.to_string())?;

        body.token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| "invalid refresh response: no token".to_string())
    }
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    refresh_timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
    auth_paths: AuthPaths,
    on_session_expired: Option<SessionExpiredHook>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: None,
            refresh_timeout: Some(DEFAULT_REFRESH_TIMEOUT),
            user_agent: None,
            store: None,
            auth_paths: AuthPaths::default(),
            on_session_expired: None,
        }
    }
}

impl ApiClientBuilder {
    /// Start from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .base_url(config.base_url.clone())
            .auth_paths(config.auth.clone())
            .refresh_timeout((config.refresh_timeout_secs > 0).then(|| {
                Duration::from_secs(config.refresh_timeout_secs)
            }));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bound the refresh call; `None` waits indefinitely
    pub fn refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Where the session lives; defaults to an in-memory store
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the authentication endpoint paths
    pub fn auth_paths(mut self, paths: AuthPaths) -> Self {
        self.auth_paths = paths;
        self
    }

    /// React to session termination, e.g. by showing the login view
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let user_agent = self.user_agent.unwrap_or_else(|| USER_AGENT.to_string());

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let sessions = SessionStore::new(store);

        #[cfg(not(target_arch = "wasm32"))]
        let cookies = CookieJar::restore(&sessions);

        #[cfg(not(target_arch = "wasm32"))]
        let client = {
            let mut builder = ClientBuilder::new()
                .user_agent(user_agent)
                .cookie_provider(cookies.provider());
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            builder.build()?
        };

        #[cfg(target_arch = "wasm32")]
        let client = {
            let _ = self.timeout; // Timeouts not supported on WASM
            ClientBuilder::new().user_agent(user_agent).build()?
        };

        Ok(ApiClient {
            client,
            base_url,
            sessions,
            #[cfg(not(target_arch = "wasm32"))]
            cookies,
            refresh: RefreshCoordinator::new(),
            refresh_timeout: self.refresh_timeout,
            auth_paths: self.auth_paths,
            on_session_expired: self.on_session_expired,
        })
    }
}
