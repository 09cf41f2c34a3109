use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthError;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{DatabaseError, DatabaseManager, Store};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware};
use crate::services::{AuthService, ProjectService};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("storage: {0}")]
    Storage(#[from] DatabaseError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),
}

/// Shared handles for every request. Built once at the composition root.
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub auth: Arc<AuthService>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, security: &SecurityConfig) -> Result<Self, AuthError> {
        Ok(Self {
            projects: ProjectService::new(store.clone()),
            auth: Arc::new(AuthService::new(store.clone(), security.clone())?),
            store,
        })
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let store = DatabaseManager::connect(&config.storage).await?;
        Ok(Self::new(store, &config.security)?)
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security.cors_origins));
    }

    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, projects};

    Router::new()
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/session", axum::routing::delete(auth::session_logout))
        .route("/api/projects", get(projects::project_list).post(projects::project_create))
        .route("/api/projects/stats", get(projects::project_stats))
        .route(
            "/api/projects/:id",
            get(projects::project_get)
                .patch(projects::project_update)
                .put(projects::project_update)
                .delete(projects::project_delete),
        )
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn admin_routes() -> Router<AppState> {
    use elevated::admin;

    Router::new()
        .route("/api/admin/stats", get(admin::admin_stats))
        .route("/api/admin/users", get(admin::admin_users))
        .route_layer(middleware::from_fn(require_admin_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
