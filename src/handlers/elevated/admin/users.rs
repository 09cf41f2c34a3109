// handlers/elevated/admin/users.rs - GET /api/admin/users handler

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::UserInfo;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/admin/users - Every registered account, without password hashes
pub async fn admin_users(State(state): State<AppState>) -> ApiResult<Vec<UserInfo>> {
    let users = state.auth.list_users().await?;
    Ok(ApiResponse::success(users))
}
