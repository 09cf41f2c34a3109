use thiserror::Error;

use crate::error::ApiError;

/// Why a remote call failed. Every mirror and auth operation returns this
/// instead of swallowing the failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not reach the server: {0}")]
    Transport(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    Validation { message: String, field: Option<String> },

    #[error("Server error: {0}")]
    Server(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Map an HTTP status plus the error envelope's message onto a variant
    pub fn from_status(status: u16, message: String, field: Option<String>) -> Self {
        match status {
            400 | 422 => ClientError::Validation { message, field },
            401 => ClientError::Unauthorized(message),
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            _ => ClientError::Server(message),
        }
    }

    /// Failures the user caused and can fix, as opposed to infrastructure trouble
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized(_)
                | ClientError::Forbidden(_)
                | ClientError::NotFound(_)
                | ClientError::Conflict(_)
                | ClientError::Validation { .. }
                | ClientError::NotSignedIn
        )
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        let field = match &err {
            ApiError::ValidationError {
                field_errors: Some(fields),
                ..
            } => fields.keys().next().cloned(),
            _ => None,
        };
        ClientError::from_status(err.status_code().as_u16(), err.message().to_string(), field)
    }
}

impl From<crate::services::ServiceError> for ClientError {
    fn from(err: crate::services::ServiceError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<crate::auth::AuthError> for ClientError {
    fn from(err: crate::auth::AuthError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<crate::policy::PolicyError> for ClientError {
    fn from(err: crate::policy::PolicyError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Transport(format!("invalid server URL: {}", err))
    }
}
