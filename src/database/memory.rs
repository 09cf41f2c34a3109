use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Project, User};
use crate::database::store::Store;

/// In-process tables shared by the memory and file stores.
/// Vectors keep insertion order, which breaks `created_at` ties.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Tables {
    pub fn list_projects(&self, owner: Option<Uuid>) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .rev()
            .filter(|p| owner.map_or(true, |owner| p.user_id == owner))
            .cloned()
            .collect();
        // Stable sort: newer inserts stay first among equal timestamps
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    pub fn get_project(&self, id: Uuid) -> Option<Project> {
        self.projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn insert_project(&mut self, project: Project) -> Result<Project, DatabaseError> {
        if self.projects.iter().any(|p| p.id == project.id) {
            return Err(DatabaseError::Conflict(format!("Project {} already exists", project.id)));
        }
        self.projects.push(project.clone());
        Ok(project)
    }

    pub fn update_project(
        &mut self,
        project: Project,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Project, DatabaseError> {
        let slot = self
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Project {}", project.id)))?;

        if let Some(expected) = expected_updated_at {
            if slot.updated_at != expected {
                return Err(DatabaseError::Conflict(format!(
                    "Project {} was modified at {}",
                    project.id, slot.updated_at
                )));
            }
        }

        // Owner and creation time are fixed at insert
        let mut stored = project;
        stored.user_id = slot.user_id;
        stored.created_at = slot.created_at;
        *slot = stored.clone();
        Ok(stored)
    }

    pub fn delete_project(&mut self, id: Uuid) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        self.projects.len() != before
    }

    pub fn insert_user(&mut self, user: User) -> Result<User, DatabaseError> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict(format!("Email {} is already registered", user.email)));
        }
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn find_user(&self, id: Uuid) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.iter().find(|u| u.email == email).cloned()
    }
}

/// Non-persistent store, used by default in development and by tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_projects(&self, owner: Option<Uuid>) -> Result<Vec<Project>, DatabaseError> {
        Ok(self.tables.read().await.list_projects(owner))
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(self.tables.read().await.get_project(id))
    }

    async fn insert_project(&self, project: Project) -> Result<Project, DatabaseError> {
        self.tables.write().await.insert_project(project)
    }

    async fn update_project(
        &self,
        project: Project,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Project, DatabaseError> {
        self.tables.write().await.update_project(project, expected_updated_at)
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.delete_project(id))
    }

    async fn insert_user(&self, user: User) -> Result<User, DatabaseError> {
        self.tables.write().await.insert_user(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.find_user(id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.find_user_by_email(email))
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewProject, ProjectStatus, Role};
    use chrono::Duration;

    fn project(owner: Uuid, title: &str, created_at: DateTime<Utc>) -> Project {
        Project::from_new(NewProject::new(title), owner, created_at).unwrap()
    }

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Someone".into(),
            role: Role::User,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn lists_newest_first_and_scopes_by_owner() {
        let store = MemoryStore::new();
        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        let t0 = Utc::now();
        store.insert_project(project(u1, "old", t0)).await.unwrap();
        store.insert_project(project(u2, "other", t0 + Duration::seconds(1))).await.unwrap();
        store.insert_project(project(u1, "new", t0 + Duration::seconds(2))).await.unwrap();

        let all: Vec<_> = store.list_projects(None).await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(all, vec!["new", "other", "old"]);

        let mine: Vec<_> = store.list_projects(Some(u1)).await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(mine, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn equal_timestamps_list_latest_insert_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t0 = Utc::now();
        store.insert_project(project(owner, "first", t0)).await.unwrap();
        store.insert_project(project(owner, "second", t0)).await.unwrap();
        let titles: Vec<_> = store.list_projects(None).await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn update_keeps_owner_and_checks_version() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let original = store.insert_project(project(owner, "a", Utc::now())).await.unwrap();

        let mut hijack = original.clone();
        hijack.user_id = Uuid::new_v4();
        hijack.status = ProjectStatus::Completed;
        hijack.updated_at = original.updated_at + Duration::seconds(1);
        let saved = store.update_project(hijack.clone(), Some(original.updated_at)).await.unwrap();
        assert_eq!(saved.user_id, owner);
        assert_eq!(saved.status, ProjectStatus::Completed);

        // Second writer still holding the original timestamp loses
        let err = store.update_project(hijack, Some(original.updated_at)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_project(project(Uuid::new_v4(), "ghost", Utc::now()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t0 = Utc::now();
        let a = store.insert_project(project(owner, "a", t0)).await.unwrap();
        let b = store.insert_project(project(owner, "b", t0 + Duration::seconds(1))).await.unwrap();
        let c = store.insert_project(project(owner, "c", t0 + Duration::seconds(2))).await.unwrap();

        assert!(store.delete_project(b.id).await.unwrap());
        assert!(!store.delete_project(b.id).await.unwrap());
        let ids: Vec<_> = store.list_projects(None).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(user("a@example.com")).await.unwrap();
        let err = store.insert_user(user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert!(store.find_user_by_email("a@example.com").await.unwrap().is_some());
    }
}
