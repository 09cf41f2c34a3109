// handlers/protected/projects/collection.rs - GET/POST /api/projects and GET /api/projects/stats

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::{Extension, Json};

use crate::app::AppState;
use crate::database::models::{NewProject, Project};
use crate::filter::{ProjectFilter, ProjectQuery, ProjectStats};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/projects - Visible projects, newest first
///
/// Optional query parameters `search`, `status` and `priority`; `All` or an
/// empty value leaves that dimension unconstrained.
pub async fn project_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ProjectQuery>, QueryRejection>,
) -> ApiResult<Vec<Project>> {
    let Query(query) = query?;
    let filter = ProjectFilter::try_from(query)?;
    let projects = state.projects.list(&user.actor(), &filter).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /api/projects - Create a project owned by the caller
///
/// Any `id`, `user_id` or timestamp keys in the body are ignored.
pub async fn project_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<Project> {
    let Json(input) = payload?;
    let project = state.projects.create(&user.actor(), input).await?;
    Ok(ApiResponse::created(project))
}

/// GET /api/projects/stats - Counters over the caller's visible set
pub async fn project_stats(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<ProjectStats> {
    let stats = state.projects.stats(&user.actor()).await?;
    Ok(ApiResponse::success(stats))
}
