// handlers/elevated/admin/stats.rs - GET /api/admin/stats handler

use axum::extract::State;
use axum::Extension;

use crate::app::AppState;
use crate::filter::AdminStats;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/admin/stats - Totals plus per-status, per-priority,
/// per-category and per-owner breakdowns across every user
pub async fn admin_stats(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<AdminStats> {
    let stats = state.projects.admin_overview(&user.actor()).await?;
    Ok(ApiResponse::success(stats))
}
