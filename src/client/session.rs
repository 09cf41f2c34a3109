use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use super::backend::ProjectBackend;
use super::error::ClientError;
use crate::database::models::UserInfo;
use crate::services::{LoginRequest, RegisterRequest, SessionInfo};

/// Message shown for failures the user cannot act on
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// A signed-in identity as the client holds it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn from_info(info: SessionInfo, now: DateTime<Utc>) -> Self {
        Self {
            token: info.token,
            user: info.user,
            expires_at: now + Duration::seconds(info.expires_in),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The message the login view shows after a failed attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
}

impl AuthFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ClientError> for AuthFailure {
    fn from(err: ClientError) -> Self {
        if err.is_user_facing() {
            AuthFailure::new(err.to_string())
        } else {
            error!("Authentication request failed: {}", err);
            AuthFailure::new(UNEXPECTED_ERROR)
        }
    }
}

/// Current session plus whether it is still being resolved.
///
/// Starts in the loading phase; [`AuthState::restore`] settles it.
#[derive(Debug, Clone)]
pub struct AuthState {
    session: Option<Session>,
    loading: bool,
    last_error: Option<AuthFailure>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthState {
    pub fn new() -> Self {
        Self {
            session: None,
            loading: true,
            last_error: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            loading: false,
            ..Self::new()
        }
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
            loading: false,
            last_error: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&AuthFailure> {
        self.last_error.as_ref()
    }

    /// Resolve a saved session against the backend. Expired or rejected
    /// tokens end signed out; transport trouble keeps the saved session.
    pub async fn restore<B>(&mut self, backend: &B, saved: Option<Session>) -> Option<&Session>
    where
        B: ProjectBackend + ?Sized,
    {
        self.loading = true;
        self.session = match saved {
            Some(session) if session.is_expired(Utc::now()) => {
                info!("Saved session for {} has expired", session.user.email);
                None
            }
            Some(mut session) => match backend.whoami(&session.token).await {
                Ok(user) => {
                    session.user = user;
                    Some(session)
                }
                Err(ClientError::Unauthorized(reason)) => {
                    info!("Saved session rejected: {}", reason);
                    None
                }
                Err(e) => {
                    warn!("Could not verify saved session: {}", e);
                    Some(session)
                }
            },
            None => None,
        };
        self.loading = false;
        self.session.as_ref()
    }

    pub async fn login<B>(&mut self, backend: &B, email: &str, password: &str) -> Result<&Session, AuthFailure>
    where
        B: ProjectBackend + ?Sized,
    {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = backend.login(request).await;
        self.settle(result)
    }

    /// The name is checked locally before any remote call
    pub async fn register<B>(
        &mut self,
        backend: &B,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<&Session, AuthFailure>
    where
        B: ProjectBackend + ?Sized,
    {
        if name.trim().is_empty() {
            let failure = AuthFailure::new("Name is required");
            self.last_error = Some(failure.clone());
            return Err(failure);
        }

        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let result = backend.register(request).await;
        self.settle(result)
    }

    /// Always ends signed out; a failed remote revoke is returned but does
    /// not keep the local session alive.
    pub async fn logout<B>(&mut self, backend: &B) -> Result<(), ClientError>
    where
        B: ProjectBackend + ?Sized,
    {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        self.last_error = None;
        backend.logout(&session.token).await.map_err(|e| {
            warn!("Remote logout failed for {}: {}", session.user.email, e);
            e
        })
    }

    fn settle(&mut self, result: Result<SessionInfo, ClientError>) -> Result<&Session, AuthFailure> {
        self.loading = false;
        match result {
            Ok(info) => {
                self.last_error = None;
                Ok(self.session.insert(Session::from_info(info, Utc::now())))
            }
            Err(e) => {
                let failure = AuthFailure::from(e);
                self.last_error = Some(failure.clone());
                Err(failure)
            }
        }
    }
}
