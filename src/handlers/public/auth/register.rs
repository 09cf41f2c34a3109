// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{RegisterRequest, SessionInfo};

/// POST /auth/register - Create an account and start a session
///
/// Input: `{ "email", "password", "name" }`. The role is never read from
/// the body; addresses listed in `SECURITY_ADMIN_EMAILS` become admins.
///
/// Errors:
/// - 400 Validation: missing name, malformed email, short password
/// - 409 Conflict: email already registered
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<SessionInfo> {
    let Json(request) = payload?;
    let session = state.auth.register(request).await?;
    Ok(ApiResponse::created(session))
}
