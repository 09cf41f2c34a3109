//! Client-held copy of the caller's visible projects.
//!
//! Mutations go to the backend first; the local list only changes once the
//! backend has answered successfully, so a failed call leaves it exactly as
//! it was.

use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use super::backend::ProjectBackend;
use super::error::ClientError;
use super::session::Session;
use crate::database::models::{NewProject, Project, ProjectPatch};
use crate::filter::{ProjectFilter, ProjectStats};

pub struct ProjectMirror<B: ProjectBackend + ?Sized> {
    backend: Arc<B>,
    identity: Option<Session>,
    projects: Vec<Project>,
    loading: bool,
}

impl<B: ProjectBackend + ?Sized> ProjectMirror<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            identity: None,
            projects: Vec::new(),
            loading: true,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// True until the first list for the current identity has resolved
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn identity(&self) -> Option<&Session> {
        self.identity.as_ref()
    }

    pub fn get(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Local search and filtering; no remote call
    pub fn filtered(&self, filter: &ProjectFilter) -> Vec<&Project> {
        filter.apply(&self.projects)
    }

    pub fn stats(&self) -> ProjectStats {
        ProjectStats::from_projects(&self.projects)
    }

    /// Switch identity. A different user (login, logout, switch) re-lists;
    /// the same user with a fresh token keeps the current list.
    pub async fn set_identity(&mut self, session: Option<Session>) -> Result<(), ClientError> {
        let previous = self.identity.as_ref().map(|s| s.user.id);
        let next = session.as_ref().map(|s| s.user.id);
        let first_resolution = self.loading;
        self.identity = session;

        if previous == next && !first_resolution {
            return Ok(());
        }
        // Never show one user's list under another identity, even when
        // the re-list below fails.
        if previous != next {
            self.projects.clear();
        }
        if next.is_none() {
            self.loading = false;
            return Ok(());
        }

        self.loading = true;
        self.refresh().await.map(|_| ())
    }

    /// Replace the mirror with the backend's list. On failure the mirror is
    /// left untouched and the error is logged and returned. After a user
    /// change it is already empty at that point.
    pub async fn refresh(&mut self) -> Result<&[Project], ClientError> {
        let Some(session) = self.identity.as_ref() else {
            self.projects.clear();
            self.loading = false;
            return Ok(&self.projects);
        };

        let result = self
            .backend
            .list_projects(&session.token, &ProjectFilter::default())
            .await;
        self.loading = false;

        match result {
            Ok(projects) => {
                debug!(user = %session.user.id, count = projects.len(), "Fetched projects");
                self.projects = projects;
                Ok(&self.projects)
            }
            Err(e) => {
                error!("Error fetching projects: {}", e);
                Err(e)
            }
        }
    }

    /// Prepends the stored record without re-listing
    pub async fn create(&mut self, input: NewProject) -> Result<&Project, ClientError> {
        let token = self.token()?;
        let project = self.backend.create_project(token, input).await.map_err(|e| {
            error!("Error adding project: {}", e);
            e
        })?;
        self.projects.insert(0, project);
        Ok(&self.projects[0])
    }

    /// Replaces the matching entry in place with the backend's record. A
    /// record missing from the mirror is returned but not added.
    pub async fn update(&mut self, id: Uuid, patch: ProjectPatch) -> Result<Project, ClientError> {
        let token = self.token()?;
        let updated = self.backend.update_project(token, id, patch).await.map_err(|e| {
            error!("Error updating project {}: {}", id, e);
            e
        })?;

        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        let token = self.token()?;
        self.backend.delete_project(token, id).await.map_err(|e| {
            error!("Error deleting project {}: {}", id, e);
            e
        })?;
        self.projects.retain(|p| p.id != id);
        Ok(())
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.identity
            .as_ref()
            .map(|s| s.token.as_str())
            .ok_or(ClientError::NotSignedIn)
    }
}
