use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::policy;

/// Role gate for `/api/admin/*`. Must run after [`super::jwt_auth_middleware`].
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if let Err(err) = policy::require_admin(&user.actor()) {
        tracing::warn!(user = %user.user_id, "Rejected non-admin request to {}", request.uri().path());
        return Err(err.into());
    }

    Ok(next.run(request).await)
}
