use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the token store.
///
/// `Clone` because one exchange result is fanned out to every caller
/// waiting on the same scope key.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Untyped input could not be interpreted (e.g. a non-object options value).
    #[error("gauth.{operation}: {message}")]
    InvalidInput {
        operation: &'static str,
        message: String,
    },

    /// Client id, client secret or refresh token is absent for a scope key.
    #[error("gauth: missing clientId/clientSecret/refreshToken for scope '{scope_key}'; call configure()")]
    MissingCredentials { scope_key: String },

    /// The token endpoint could not be reached or did not return an access token.
    #[error("gauth: {message}")]
    Exchange {
        status: Option<u16>,
        body: Option<Value>,
        message: String,
    },
}

impl AuthError {
    pub fn invalid_input(operation: &'static str, message: impl Into<String>) -> Self {
        AuthError::InvalidInput {
            operation,
            message: message.into(),
        }
    }

    /// Upstream status code, when the failure came back from the token endpoint.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Exchange { status, .. } => *status,
            _ => None,
        }
    }

    /// Parsed upstream body, when there was one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            AuthError::Exchange { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Short label used for the failure-reason metric.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidInput { .. } => "invalid_input",
            AuthError::MissingCredentials { .. } => "missing_credentials",
            AuthError::Exchange { status: None, .. } => "transport",
            AuthError::Exchange { .. } => "upstream",
        }
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
