// handlers/protected/auth/session.rs - GET /api/auth/whoami and DELETE /api/auth/session

use axum::extract::State;
use axum::Extension;
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::UserInfo;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    #[serde(flatten)]
    pub user: UserInfo,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// GET /api/auth/whoami - Current user, read fresh from the store
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": "user_uuid",
///     "email": "dev@example.com",
///     "name": "Dev",
///     "role": "user",
///     "expires_at": "2025-01-01T12:00:00Z"
///   }
/// }
/// ```
pub async fn session_whoami(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<WhoAmI> {
    let profile = state.auth.whoami(user.user_id).await?;
    Ok(ApiResponse::success(WhoAmI {
        user: profile,
        expires_at: user.expires_at(),
    }))
}

/// DELETE /api/auth/session - Log out by revoking the presented token
pub async fn session_logout(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    state.auth.logout(user.jti, user.exp).await;
    Ok(ApiResponse::success(json!({ "logged_out": true })))
}
