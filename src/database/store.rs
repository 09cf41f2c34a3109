use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Project, User};

/// Persistence for projects and accounts.
///
/// Implementations do not apply the access policy; callers scope reads
/// through `owner` and check ownership before writes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs and the health endpoint
    fn backend_name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Projects ordered by `created_at` descending. `None` returns every owner's records.
    async fn list_projects(&self, owner: Option<Uuid>) -> Result<Vec<Project>, DatabaseError>;

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;

    async fn insert_project(&self, project: Project) -> Result<Project, DatabaseError>;

    /// Replace the stored record with the same id. When `expected_updated_at`
    /// is given and differs from the stored value the write is refused with
    /// [`DatabaseError::Conflict`].
    async fn update_project(
        &self,
        project: Project,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Project, DatabaseError>;

    /// Returns false when no record had that id
    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Fails with [`DatabaseError::Conflict`] when the email is taken
    async fn insert_user(&self, user: User) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// `email` must already be normalized
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
}
