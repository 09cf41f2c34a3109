use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::memory::Tables;
use crate::database::models::{Project, User};
use crate::database::store::Store;

/// Single-slot JSON persistence: the whole document is read once on open
/// and rewritten after every successful mutation.
pub struct FileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl FileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref().to_path_buf();

        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Tables::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Opened file store {} ({} users, {} projects)",
            path.display(),
            tables.users.len(),
            tables.projects.len()
        );

        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file then rename, so a crash mid-write never
    /// leaves a truncated slot behind.
    async fn persist(&self, tables: &Tables) -> Result<(), DatabaseError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(tables)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} projects to {}", tables.projects.len(), self.path.display());
        Ok(())
    }

    /// Apply `op` to a copy, persist it, and only then swap it in. A failed
    /// write leaves memory and disk agreeing.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Tables) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl Store for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        let _guard = self.tables.read().await;
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            // Nothing written yet is healthy
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_projects(&self, owner: Option<Uuid>) -> Result<Vec<Project>, DatabaseError> {
        Ok(self.tables.read().await.list_projects(owner))
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(self.tables.read().await.get_project(id))
    }

    async fn insert_project(&self, project: Project) -> Result<Project, DatabaseError> {
        self.mutate(|t| t.insert_project(project)).await
    }

    async fn update_project(
        &self,
        project: Project,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Project, DatabaseError> {
        self.mutate(|t| t.update_project(project, expected_updated_at)).await
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        if !next.delete_project(id) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *guard = next;
        Ok(true)
    }

    async fn insert_user(&self, user: User) -> Result<User, DatabaseError> {
        self.mutate(|t| t.insert_user(user)).await
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
