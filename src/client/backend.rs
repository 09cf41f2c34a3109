use async_trait::async_trait;
use uuid::Uuid;

use super::error::ClientError;
use crate::database::models::{NewProject, Project, ProjectPatch, UserInfo};
use crate::filter::{AdminStats, ProjectFilter, ProjectStats};
use crate::services::{LoginRequest, RegisterRequest, SessionInfo};

/// The remote side of the dashboard: session issuance plus the project
/// table. Scope and ownership are enforced behind this trait, never by the
/// caller.
#[async_trait]
pub trait ProjectBackend: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<SessionInfo, ClientError>;

    async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ClientError>;

    async fn logout(&self, token: &str) -> Result<(), ClientError>;

    async fn whoami(&self, token: &str) -> Result<UserInfo, ClientError>;

    /// Newest first
    async fn list_projects(&self, token: &str, filter: &ProjectFilter) -> Result<Vec<Project>, ClientError>;

    async fn create_project(&self, token: &str, input: NewProject) -> Result<Project, ClientError>;

    async fn update_project(&self, token: &str, id: Uuid, patch: ProjectPatch) -> Result<Project, ClientError>;

    async fn delete_project(&self, token: &str, id: Uuid) -> Result<(), ClientError>;

    async fn project_stats(&self, token: &str) -> Result<ProjectStats, ClientError>;

    async fn admin_stats(&self, token: &str) -> Result<AdminStats, ClientError>;

    async fn admin_users(&self, token: &str) -> Result<Vec<UserInfo>, ClientError>;
}
