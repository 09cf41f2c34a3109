// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, SessionInfo};

/// POST /auth/login - Authenticate with email and password
///
/// Expected Input:
/// ```json
/// { "email": "dev@example.com", "password": "secret1" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expires_in": 86400,
///     "user": { "id": "...", "email": "dev@example.com", "name": "Dev", "role": "user" }
///   }
/// }
/// ```
///
/// Unknown email and wrong password both answer 401 with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<SessionInfo> {
    let Json(request) = payload?;
    let session = state.auth.login(request).await?;
    Ok(ApiResponse::success(session))
}
