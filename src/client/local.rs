use async_trait::async_trait;
use uuid::Uuid;

use super::backend::ProjectBackend;
use super::error::ClientError;
use crate::app::AppState;
use crate::database::models::{NewProject, Project, ProjectPatch, UserInfo};
use crate::filter::{AdminStats, ProjectFilter, ProjectStats};
use crate::policy::{self, Actor};
use crate::services::{LoginRequest, RegisterRequest, SessionInfo};

/// `ProjectBackend` that calls the services directly, skipping HTTP.
/// Tokens are still verified, so revocation and role checks behave the
/// same as over the wire.
#[derive(Clone)]
pub struct LocalBackend {
    state: AppState,
}

impl LocalBackend {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn actor(&self, token: &str) -> Result<Actor, ClientError> {
        let claims = self.state.auth.authenticate(token).await?;
        Ok(Actor::new(claims.sub, claims.role))
    }
}

#[async_trait]
impl ProjectBackend for LocalBackend {
    async fn register(&self, request: RegisterRequest) -> Result<SessionInfo, ClientError> {
        Ok(self.state.auth.register(request).await?)
    }

    async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ClientError> {
        Ok(self.state.auth.login(request).await?)
    }

    async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let claims = self.state.auth.authenticate(token).await?;
        self.state.auth.logout(claims.jti, claims.exp).await;
        Ok(())
    }

    async fn whoami(&self, token: &str) -> Result<UserInfo, ClientError> {
        let actor = self.actor(token).await?;
        Ok(self.state.auth.whoami(actor.id).await?)
    }

    async fn list_projects(&self, token: &str, filter: &ProjectFilter) -> Result<Vec<Project>, ClientError> {
        let actor = self.actor(token).await?;
        Ok(self.state.projects.list(&actor, filter).await?)
    }

    async fn create_project(&self, token: &str, input: NewProject) -> Result<Project, ClientError> {
        let actor = self.actor(token).await?;
        Ok(self.state.projects.create(&actor, input).await?)
    }

    async fn update_project(&self, token: &str, id: Uuid, patch: ProjectPatch) -> Result<Project, ClientError> {
        let actor = self.actor(token).await?;
        Ok(self.state.projects.update(&actor, id, patch).await?)
    }

    async fn delete_project(&self, token: &str, id: Uuid) -> Result<(), ClientError> {
        let actor = self.actor(token).await?;
        Ok(self.state.projects.delete(&actor, id).await?)
    }

    async fn project_stats(&self, token: &str) -> Result<ProjectStats, ClientError> {
        let actor = self.actor(token).await?;
        Ok(self.state.projects.stats(&actor).await?)
    }

    async fn admin_stats(&self, token: &str) -> Result<AdminStats, ClientError> {
        let actor = self.actor(token).await?;
        Ok(self.state.projects.admin_overview(&actor).await?)
    }

    async fn admin_users(&self, token: &str) -> Result<Vec<UserInfo>, ClientError> {
        let actor = self.actor(token).await?;
        policy::require_admin(&actor)?;
        Ok(self.state.auth.list_users().await?)
    }
}
