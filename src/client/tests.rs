use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::client::{Access, ClientError, Dashboard, GuardOutcome, LocalBackend, ProjectBackend, Theme};
use crate::database::models::{NewProject, Project, ProjectPatch, ProjectPriority, ProjectStatus, Role, UserInfo};
use crate::filter::{AdminStats, ProjectFilter, ProjectStats};
use crate::services::{LoginRequest, RegisterRequest, SessionInfo};
use crate::testing::{TestContext, TEST_PASSWORD};

/// Local backend whose list call can be switched off
struct ListOutage {
    inner: Arc<LocalBackend>,
    down: AtomicBool,
}

#[async_trait]
impl ProjectBackend for ListOutage {
    async fn register(&self, request: RegisterRequest) -> Result<SessionInfo, ClientError> {
        self.inner.register(request).await
    }

    async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ClientError> {
        self.inner.login(request).await
    }

    async fn logout(&self, token: &str) -> Result<(), ClientError> {
        self.inner.logout(token).await
    }

    async fn whoami(&self, token: &str) -> Result<UserInfo, ClientError> {
        self.inner.whoami(token).await
    }

    async fn list_projects(&self, token: &str, filter: &ProjectFilter) -> Result<Vec<Project>, ClientError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".into()));
        }
        self.inner.list_projects(token, filter).await
    }

    async fn create_project(&self, token: &str, input: NewProject) -> Result<Project, ClientError> {
        self.inner.create_project(token, input).await
    }

    async fn update_project(&self, token: &str, id: Uuid, patch: ProjectPatch) -> Result<Project, ClientError> {
        self.inner.update_project(token, id, patch).await
    }

    async fn delete_project(&self, token: &str, id: Uuid) -> Result<(), ClientError> {
        self.inner.delete_project(token, id).await
    }

    async fn project_stats(&self, token: &str) -> Result<ProjectStats, ClientError> {
        self.inner.project_stats(token).await
    }

    async fn admin_stats(&self, token: &str) -> Result<AdminStats, ClientError> {
        self.inner.admin_stats(token).await
    }

    async fn admin_users(&self, token: &str) -> Result<Vec<UserInfo>, ClientError> {
        self.inner.admin_users(token).await
    }
}

fn site_redesign() -> NewProject {
    NewProject::new("Site Redesign")
        .description("Refresh the marketing site")
        .status(ProjectStatus::Planning)
        .priority(ProjectPriority::High)
        .category("Design")
}

#[tokio::test]
async fn created_project_is_visible_to_owner_and_admin_only() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut u1 = ctx.signed_in(&TestContext::unique_email("u1")).await?;
    let mut u2 = ctx.signed_in(&TestContext::unique_email("u2")).await?;
    let mut admin = ctx.signed_in("admin@example.com").await?;
    assert_eq!(admin.session().map(|s| s.user.role), Some(Role::Admin));

    let created = u1.projects_mut().create(site_redesign()).await?.clone();
    let owner = u1.session().map(|s| s.user.id);
    assert_eq!(Some(created.user_id), owner);
    assert_eq!(created.status, ProjectStatus::Planning);
    assert_eq!(created.priority, ProjectPriority::High);

    u1.projects_mut().refresh().await?;
    assert!(u1.projects().get(created.id).is_some());

    u2.projects_mut().refresh().await?;
    assert!(u2.projects().get(created.id).is_none());

    admin.projects_mut().refresh().await?;
    assert!(admin.projects().get(created.id).is_some());
    Ok(())
}

#[tokio::test]
async fn create_prepends_without_refetch() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut dash = ctx.signed_in(&TestContext::unique_email("dev")).await?;

    dash.projects_mut().create(NewProject::new("First")).await?;
    dash.projects_mut().create(NewProject::new("Second")).await?;

    let titles: Vec<_> = dash.projects().projects().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
    Ok(())
}

#[tokio::test]
async fn status_update_changes_nothing_else() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut dash = ctx.signed_in(&TestContext::unique_email("dev")).await?;
    let before = dash.projects_mut().create(site_redesign()).await?.clone();

    dash.projects_mut()
        .update(before.id, ProjectPatch::status(ProjectStatus::Completed))
        .await?;

    let after = dash.projects().get(before.id).cloned().expect("still mirrored");
    assert_eq!(after.status, ProjectStatus::Completed);
    assert_eq!(after.title, before.title);
    assert_eq!(after.description, before.description);
    assert_eq!(after.priority, before.priority);
    assert_eq!(after.category, before.category);
    assert_eq!(after.user_id, before.user_id);
    assert_eq!(after.created_at, before.created_at);
    Ok(())
}

#[tokio::test]
async fn delete_removes_one_and_keeps_order() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut dash = ctx.signed_in(&TestContext::unique_email("dev")).await?;
    for title in ["A", "B", "C", "D"] {
        dash.projects_mut().create(NewProject::new(title)).await?;
    }
    let target = dash.projects().projects()[1].id;

    dash.projects_mut().delete(target).await?;

    let titles: Vec<_> = dash.projects().projects().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["D", "B", "A"]);
    Ok(())
}

#[tokio::test]
async fn failed_mutations_leave_the_mirror_alone() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut owner = ctx.signed_in(&TestContext::unique_email("owner")).await?;
    let mut other = ctx.signed_in(&TestContext::unique_email("other")).await?;
    let project = owner.projects_mut().create(NewProject::new("Mine")).await?.clone();
    other.projects_mut().create(NewProject::new("Theirs")).await?;
    let snapshot = other.projects().projects().to_vec();

    let err = other
        .projects_mut()
        .update(project.id, ProjectPatch::status(ProjectStatus::OnHold))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(other.projects_mut().delete(project.id).await.is_err());
    let err = other.projects_mut().create(NewProject::new("   ")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation { .. }));

    assert_eq!(other.projects().projects(), snapshot.as_slice());
    Ok(())
}

#[tokio::test]
async fn identity_change_relists_and_logout_clears() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let email = TestContext::unique_email("dev");
    let mut dash = ctx.signed_in(&email).await?;
    dash.projects_mut().create(NewProject::new("Kept")).await?;

    dash.logout().await?;
    assert!(dash.projects().projects().is_empty());
    assert!(!dash.projects().loading());
    assert_eq!(dash.guard(Access::Authenticated), GuardOutcome::Login);

    dash.login(&email, TEST_PASSWORD).await?;
    assert_eq!(dash.projects().projects().len(), 1);
    assert_eq!(dash.projects().projects()[0].title, "Kept");
    Ok(())
}

#[tokio::test]
async fn restoring_a_revoked_session_ends_signed_out() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut first = ctx.signed_in(&TestContext::unique_email("dev")).await?;
    let saved = first.session().cloned();
    first.logout().await?;

    let mut second = ctx.dashboard();
    assert_eq!(second.guard(Access::Authenticated), GuardOutcome::Loading);
    second.restore(saved).await?;
    assert_eq!(second.guard(Access::Authenticated), GuardOutcome::Login);
    Ok(())
}

#[tokio::test]
async fn auth_failures_carry_a_message() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut dash = ctx.dashboard();
    dash.restore(None).await?;

    let failure = dash.register("dev@example.com", TEST_PASSWORD, "").await.unwrap_err();
    assert_eq!(failure.message, "Name is required");

    let failure = dash.login("nobody@example.com", TEST_PASSWORD).await.unwrap_err();
    assert_eq!(failure.message, "Invalid email or password");
    assert_eq!(dash.auth().last_error(), Some(&failure));
    Ok(())
}

#[tokio::test]
async fn admin_views_are_gated() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let user = ctx.signed_in(&TestContext::unique_email("dev")).await?;
    assert_eq!(user.guard(Access::Admin), GuardOutcome::AccessDenied);
    assert!(matches!(user.admin_stats().await, Err(ClientError::Forbidden(_))));

    let mut admin = ctx.signed_in("admin@example.com").await?;
    admin.projects_mut().create(NewProject::new("Audit")).await?;
    let stats = admin.admin_stats().await?;
    assert_eq!(stats.totals.total, 1);
    assert_eq!(admin.admin_users().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn local_filter_and_stats_use_the_mirror() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let mut dash = ctx.signed_in(&TestContext::unique_email("dev")).await?;
    dash.projects_mut().create(site_redesign()).await?;
    dash.projects_mut()
        .create(NewProject::new("Marketing Plan").status(ProjectStatus::Completed))
        .await?;

    let found = dash.projects().filtered(&ProjectFilter::new().search("redesign"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Site Redesign");

    let stats = dash.projects().stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.high_priority, 1);
    Ok(())
}

#[tokio::test]
async fn switching_user_with_a_failed_relist_leaves_an_empty_mirror() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let backend = Arc::new(ListOutage {
        inner: ctx.backend.clone(),
        down: AtomicBool::new(false),
    });
    let mut dash = Dashboard::new(backend.clone(), Theme::default());
    dash.restore(None).await?;

    let first = TestContext::unique_email("u1");
    let second = TestContext::unique_email("u2");
    dash.register(&second, TEST_PASSWORD, "Second").await?;
    dash.logout().await?;
    dash.register(&first, TEST_PASSWORD, "First").await?;
    dash.projects_mut().create(NewProject::new("First's plans")).await?;

    // Same identity: a failed refresh keeps what is there
    backend.down.store(true, Ordering::SeqCst);
    assert!(dash.projects_mut().refresh().await.is_err());
    assert_eq!(dash.projects().projects().len(), 1);

    let session = dash.login(&second, TEST_PASSWORD).await?;
    assert!(dash.guard(Access::Authenticated).is_granted());
    assert!(dash.projects().projects().is_empty());
    assert!(dash
        .projects()
        .projects()
        .iter()
        .all(|p| p.user_id == session.user.id));

    backend.down.store(false, Ordering::SeqCst);
    dash.projects_mut().refresh().await?;
    assert!(dash.projects().projects().is_empty());
    Ok(())
}
