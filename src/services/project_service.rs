use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{NewProject, Project, ProjectPatch, UserInfo, ValidationError};
use crate::database::{DatabaseError, Store};
use crate::filter::{AdminStats, ProjectFilter, ProjectStats};
use crate::policy::{self, Actor};
use crate::types::Operation;

/// Project reads and writes with the owner-or-admin policy applied at
/// every entry point.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Visible projects, newest first, narrowed by `filter`
    pub async fn list(&self, actor: &Actor, filter: &ProjectFilter) -> Result<Vec<Project>, ServiceError> {
        let projects = self.store.list_projects(policy::list_scope(actor)).await?;
        let total = projects.len();
        let projects = filter.apply_owned(projects);
        debug!(actor = %actor.id, total, matched = projects.len(), "Listed projects");
        Ok(projects)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Project, ServiceError> {
        self.load_authorized(actor, id, Operation::Select).await
    }

    pub async fn create(&self, actor: &Actor, input: NewProject) -> Result<Project, ServiceError> {
        let project = Project::from_new(input, actor.id, Utc::now())?;
        let project = self.store.insert_project(project).await?;
        info!(actor = %actor.id, project = %project.id, "Created project '{}'", project.title);
        Ok(project)
    }

    /// Partial update. Last write wins unless the patch carries
    /// `expected_updated_at`, in which case a moved-on record is refused.
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: ProjectPatch) -> Result<Project, ServiceError> {
        if patch.is_empty() {
            return Err(ValidationError::new("patch", "No fields to update").into());
        }

        let mut project = self.load_authorized(actor, id, Operation::Update).await?;
        if let Some(expected) = patch.expected_updated_at {
            if expected != project.updated_at {
                return Err(ServiceError::StaleUpdate(id));
            }
        }

        patch.apply(&mut project, Utc::now())?;
        let project = self
            .store
            .update_project(project, patch.expected_updated_at)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => ServiceError::ProjectNotFound(id),
                DatabaseError::Conflict(_) => ServiceError::StaleUpdate(id),
                other => other.into(),
            })?;

        info!(actor = %actor.id, project = %id, "Updated project");
        Ok(project)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        self.load_authorized(actor, id, Operation::Delete).await?;
        if !self.store.delete_project(id).await? {
            return Err(ServiceError::ProjectNotFound(id));
        }
        info!(actor = %actor.id, project = %id, "Deleted project");
        Ok(())
    }

    /// Counters over the caller's visible set
    pub async fn stats(&self, actor: &Actor) -> Result<ProjectStats, ServiceError> {
        let projects = self.store.list_projects(policy::list_scope(actor)).await?;
        Ok(ProjectStats::from_projects(&projects))
    }

    pub async fn admin_overview(&self, actor: &Actor) -> Result<AdminStats, ServiceError> {
        policy::require_admin(actor)?;
        let projects = self.store.list_projects(None).await?;
        let users: Vec<UserInfo> = self.store.list_users().await?.iter().map(UserInfo::from).collect();
        Ok(AdminStats::compute(&projects, &users))
    }

    async fn load_authorized(&self, actor: &Actor, id: Uuid, op: Operation) -> Result<Project, ServiceError> {
        let project = self
            .store
            .get_project(id)
            .await?
            .ok_or(ServiceError::ProjectNotFound(id))?;
        policy::authorize(actor, &project, op)?;
        Ok(project)
    }
}
