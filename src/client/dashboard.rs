use std::sync::Arc;
use tracing::warn;

use super::backend::ProjectBackend;
use super::error::ClientError;
use super::guard::{Access, GuardOutcome, RouteGuard};
use super::mirror::ProjectMirror;
use super::session::{AuthFailure, AuthState, Session};
use super::theme::Theme;
use crate::database::models::UserInfo;
use crate::filter::AdminStats;

/// Application state for one client: auth, theme and the project mirror,
/// wired to a single backend. Built once and passed around explicitly.
pub struct Dashboard<B: ProjectBackend + ?Sized> {
    backend: Arc<B>,
    auth: AuthState,
    theme: Theme,
    projects: ProjectMirror<B>,
}

impl<B: ProjectBackend + ?Sized> Dashboard<B> {
    pub fn new(backend: Arc<B>, theme: Theme) -> Self {
        Self {
            projects: ProjectMirror::new(backend.clone()),
            backend,
            auth: AuthState::new(),
            theme,
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn session(&self) -> Option<&Session> {
        self.auth.session()
    }

    pub fn projects(&self) -> &ProjectMirror<B> {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut ProjectMirror<B> {
        &mut self.projects
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle()
    }

    pub fn guard(&self, access: Access) -> GuardOutcome<'_> {
        RouteGuard::evaluate(&self.auth, access)
    }

    /// Settle the auth state from a saved session and load the matching list
    pub async fn restore(&mut self, saved: Option<Session>) -> Result<(), ClientError> {
        self.auth.restore(self.backend.as_ref(), saved).await;
        self.sync_identity().await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, AuthFailure> {
        let session = self.auth.login(self.backend.as_ref(), email, password).await?.clone();
        self.sync_identity_after_auth().await;
        Ok(session)
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<Session, AuthFailure> {
        let session = self
            .auth
            .register(self.backend.as_ref(), email, password, name)
            .await?
            .clone();
        self.sync_identity_after_auth().await;
        Ok(session)
    }

    /// Ends signed out with an empty mirror even when the remote revoke fails
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let remote = self.auth.logout(self.backend.as_ref()).await;
        self.sync_identity().await?;
        remote
    }

    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        let session = self.admin_session()?;
        self.backend.admin_stats(&session.token).await
    }

    pub async fn admin_users(&self) -> Result<Vec<UserInfo>, ClientError> {
        let session = self.admin_session()?;
        self.backend.admin_users(&session.token).await
    }

    fn admin_session(&self) -> Result<&Session, ClientError> {
        match self.guard(Access::Admin) {
            GuardOutcome::Granted(session) => Ok(session),
            GuardOutcome::AccessDenied => Err(ClientError::Forbidden(super::guard::ACCESS_DENIED_MESSAGE.to_string())),
            GuardOutcome::Loading | GuardOutcome::Login => Err(ClientError::NotSignedIn),
        }
    }

    async fn sync_identity(&mut self) -> Result<(), ClientError> {
        let session = self.auth.session().cloned();
        self.projects.set_identity(session).await
    }

    // Sign-in succeeded; a failed first list is logged by the mirror and
    // retried on the next refresh.
    async fn sync_identity_after_auth(&mut self) {
        if let Err(e) = self.sync_identity().await {
            warn!("Signed in but the project list could not be loaded: {}", e);
        }
    }
}
