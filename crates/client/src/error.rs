//! Client error types

use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// The token refresh failed and the session was terminated
    #[error("Session expired: {0}")]
    AuthExpired(String),

    /// The backend rejected the credentials and no refresh applies
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login answered without a token
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The refresh this request waited on was cancelled before finishing.
    /// The session is kept; the request may simply be issued again.
    #[error("Token refresh was abandoned")]
    RefreshAbandoned,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Coarse classification handed to the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Session is gone, the user has to log in again
    AuthExpired,
    /// Authorization was refused without a refreshable session
    Unauthorized,
    /// Anything else, rendered verbatim
    NetworkOrServer,
}

impl ClientError {
    /// Create error from a non-success HTTP status code.
    ///
    /// 401 maps to [`ClientError::Unauthorized`]; callers that can still
    /// refresh must intercept it before getting here.
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthExpired(_) => ErrorKind::AuthExpired,
            Self::Unauthorized(_) | Self::LoginRejected(_) => ErrorKind::Unauthorized,
            _ => ErrorKind::NetworkOrServer,
        }
    }

    /// Whether the session was terminated and the user must log in again
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired(_))
    }

    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::BadRequest(_) => Some(400),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ClientError::from_status(StatusCode::NOT_FOUND, "gone".into()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "no".into()),
            ClientError::Unauthorized(_)
        ));
        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, "upstream".into());
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.kind(), ErrorKind::NetworkOrServer);
    }

    #[test]
    fn kinds() {
        assert_eq!(
            ClientError::AuthExpired("x".into()).kind(),
            ErrorKind::AuthExpired
        );
        assert_eq!(
            ClientError::Unauthorized("x".into()).kind(),
            ErrorKind::Unauthorized
        );
        assert!(ClientError::AuthExpired("x".into()).is_auth_expired());
        assert!(!ClientError::Forbidden("x".into()).is_auth_expired());
        assert!(!ClientError::RefreshAbandoned.is_auth_expired());
        assert_eq!(
            ClientError::RefreshAbandoned.kind(),
            ErrorKind::NetworkOrServer
        );
    }
}
