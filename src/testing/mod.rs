use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::client::{Dashboard, LocalBackend, Theme};
use crate::config::AppConfig;
use crate::database::MemoryStore;

pub const TEST_PASSWORD: &str = "correct-horse";

/// In-memory app state plus an in-process backend over it
pub struct TestContext {
    pub state: AppState,
    pub backend: Arc<LocalBackend>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = AppConfig::development();
        let state = AppState::new(Arc::new(MemoryStore::new()), &config.security)
            .expect("development security config is valid");
        let backend = Arc::new(LocalBackend::new(state.clone()));
        Self { state, backend }
    }

    /// A dashboard that has not resolved its session yet
    pub fn dashboard(&self) -> Dashboard<LocalBackend> {
        Dashboard::new(self.backend.clone(), Theme::default())
    }

    /// Register a fresh account and return a dashboard signed in as it.
    /// `admin@example.com` is the admin address in the development preset.
    pub async fn signed_in(&self, email: &str) -> anyhow::Result<Dashboard<LocalBackend>> {
        let mut dashboard = self.dashboard();
        dashboard.restore(None).await?;
        dashboard
            .register(email, TEST_PASSWORD, &display_name(email))
            .await?;
        Ok(dashboard)
    }

    /// Unique address so tests sharing a store never collide
    pub fn unique_email(prefix: &str) -> String {
        format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
    }
}

fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
