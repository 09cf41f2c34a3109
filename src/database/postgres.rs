use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Project, User};
use crate::database::store::Store;

const PROJECT_COLUMNS: &str =
    "id, title, description, status, priority, category, user_id, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, name, role, password_hash, created_at";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL CHECK (length(btrim(title)) > 0),
        description TEXT,
        status TEXT NOT NULL,
        priority TEXT NOT NULL,
        category TEXT NOT NULL,
        user_id UUID NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS projects_user_created_idx ON projects (user_id, created_at DESC)",
];

/// PostgreSQL-backed store
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables when missing. Idempotent.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ensured");
        Ok(())
    }
}

fn project_from_row(row: &PgRow) -> Result<Project, DatabaseError> {
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    Ok(Project {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: status.parse().map_err(|e| DatabaseError::Corrupt(format!("{}", e)))?,
        priority: priority.parse().map_err(|e| DatabaseError::Corrupt(format!("{}", e)))?,
        category: row.try_get("category")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, DatabaseError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: role.parse().map_err(|e| DatabaseError::Corrupt(format!("{}", e)))?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl Store for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_projects(&self, owner: Option<Uuid>) -> Result<Vec<Project>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM projects WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
            PROJECT_COLUMNS
        );
        let rows = sqlx::query(&query).bind(owner).fetch_all(&self.pool).await?;
        rows.iter().map(project_from_row).collect()
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let query = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn insert_project(&self, project: Project) -> Result<Project, DatabaseError> {
        let query = format!(
            "INSERT INTO projects ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            PROJECT_COLUMNS, PROJECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.status.as_str())
            .bind(project.priority.as_str())
            .bind(&project.category)
            .bind(project.user_id)
            .bind(project.created_at)
            .bind(project.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::Conflict(format!("Project {} already exists", project.id))
                } else {
                    e.into()
                }
            })?;
        project_from_row(&row)
    }

    async fn update_project(
        &self,
        project: Project,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Project, DatabaseError> {
        // user_id and created_at are never rewritten
        let query = format!(
            "UPDATE projects
             SET title = $2, description = $3, status = $4, priority = $5, category = $6, updated_at = $7
             WHERE id = $1 AND ($8::timestamptz IS NULL OR updated_at = $8)
             RETURNING {}",
            PROJECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.status.as_str())
            .bind(project.priority.as_str())
            .bind(&project.category)
            .bind(project.updated_at)
            .bind(expected_updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => project_from_row(&row),
            None => match self.get_project(project.id).await? {
                Some(current) => Err(DatabaseError::Conflict(format!(
                    "Project {} was modified at {}",
                    project.id, current.updated_at
                ))),
                None => Err(DatabaseError::NotFound(format!("Project {}", project.id))),
            },
        }
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_user(&self, user: User) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS, USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.role.as_str())
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::Conflict(format!("Email {} is already registered", user.email))
                } else {
                    e.into()
                }
            })?;
        user_from_row(&row)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&query).bind(email).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Run against a disposable database: `DATABASE_URL=postgres://... cargo test postgres`.
    //! Skipped when `DATABASE_URL` is unset.

    use super::*;
    use crate::database::models::{NewProject, ProjectStatus, Role};
    use chrono::{Duration, DurationRound};
    use once_cell::sync::Lazy;
    use tokio::sync::Mutex;

    // Concurrent CREATE TABLE IF NOT EXISTS can still collide
    static MIGRATED: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

    async fn store() -> Option<PostgresStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping postgres store test");
            return None;
        };
        let store = PostgresStore::connect(&url, 2).await.unwrap();
        let mut migrated = MIGRATED.lock().await;
        if !*migrated {
            store.migrate().await.unwrap();
            *migrated = true;
        }
        Some(store)
    }

    // Postgres keeps microseconds
    fn now() -> DateTime<Utc> {
        Utc::now().duration_trunc(Duration::microseconds(1)).unwrap()
    }

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Someone".into(),
            role: Role::User,
            password_hash: "hash".into(),
            created_at: now(),
        }
    }

    async fn owner(store: &PostgresStore) -> Uuid {
        let email = format!("pg-{}@example.com", Uuid::new_v4().simple());
        store.insert_user(user(&email)).await.unwrap().id
    }

    fn project(owner: Uuid, title: &str, created_at: DateTime<Utc>) -> Project {
        Project::from_new(NewProject::new(title), owner, created_at).unwrap()
    }

    #[tokio::test]
    async fn lists_newest_first_and_scopes_by_owner() {
        let Some(store) = store().await else { return };
        let (u1, u2) = (owner(&store).await, owner(&store).await);
        let t0 = now();
        let old = store.insert_project(project(u1, "old", t0)).await.unwrap();
        let other = store.insert_project(project(u2, "other", t0 + Duration::seconds(1))).await.unwrap();
        let new = store.insert_project(project(u1, "new", t0 + Duration::seconds(2))).await.unwrap();
        assert_eq!(new.created_at, t0 + Duration::seconds(2));

        let mine: Vec<_> = store.list_projects(Some(u1)).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(mine, vec![new.id, old.id]);

        let ours = [old.id, other.id, new.id];
        let all: Vec<_> = store
            .list_projects(None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .filter(|id| ours.contains(id))
            .collect();
        assert_eq!(all, vec![new.id, other.id, old.id]);
    }

    #[tokio::test]
    async fn update_keeps_owner_and_checks_version() {
        let Some(store) = store().await else { return };
        let owner_id = owner(&store).await;
        let original = store.insert_project(project(owner_id, "a", now())).await.unwrap();

        let mut hijack = original.clone();
        hijack.user_id = Uuid::new_v4();
        hijack.status = ProjectStatus::Completed;
        hijack.updated_at = original.updated_at + Duration::seconds(1);
        let saved = store.update_project(hijack.clone(), Some(original.updated_at)).await.unwrap();
        assert_eq!(saved.user_id, owner_id);
        assert_eq!(saved.status, ProjectStatus::Completed);
        assert_eq!(saved.created_at, original.created_at);

        let err = store.update_project(hijack.clone(), Some(original.updated_at)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));

        // No expected timestamp: last write wins
        hijack.title = "b".into();
        assert_eq!(store.update_project(hijack, None).await.unwrap().title, "b");
    }

    #[tokio::test]
    async fn update_and_delete_missing_project() {
        let Some(store) = store().await else { return };
        let missing = project(Uuid::new_v4(), "ghost", now());
        let err = store.update_project(missing.clone(), None).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
        assert!(!store.delete_project(missing.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let Some(store) = store().await else { return };
        let email = format!("dup-{}@example.com", Uuid::new_v4().simple());
        let first = store.insert_user(user(&email)).await.unwrap();
        assert_eq!(store.find_user_by_email(&email).await.unwrap().map(|u| u.id), Some(first.id));

        let err = store.insert_user(user(&email)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn health_check_and_delete() {
        let Some(store) = store().await else { return };
        store.health_check().await.unwrap();
        let owner_id = owner(&store).await;
        let p = store.insert_project(project(owner_id, "gone", now())).await.unwrap();
        assert!(store.delete_project(p.id).await.unwrap());
        assert!(store.get_project(p.id).await.unwrap().is_none());
    }
}
