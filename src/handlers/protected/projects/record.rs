// handlers/protected/projects/record.rs - GET, PATCH/PUT and DELETE /api/projects/:id

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Project, ProjectPatch};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/projects/:id
///
/// Projects owned by someone else answer 404 exactly like missing ones.
pub async fn project_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Project> {
    let Path(id) = id?;
    let project = state.projects.get(&user.actor(), id).await?;
    Ok(ApiResponse::success(project))
}

/// PATCH or PUT /api/projects/:id - Partial update
///
/// Only the fields present in the body change. Adding
/// `"expected_updated_at"` turns on the stale-write check (409 on mismatch).
pub async fn project_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ProjectPatch>, JsonRejection>,
) -> ApiResult<Project> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let project = state.projects.update(&user.actor(), id, patch).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;
    state.projects.delete(&user.actor(), id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
