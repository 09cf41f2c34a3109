pub mod auth_service;
pub mod project_service;

pub use auth_service::{AuthService, LoginRequest, RegisterRequest, SessionInfo};
pub use project_service::ProjectService;

use thiserror::Error;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::database::models::ValidationError;
use crate::database::DatabaseError;
use crate::filter::error::FilterError;
use crate::policy::PolicyError;

/// Everything a service call can fail with. The HTTP layer maps each
/// variant onto a status code; the in-process client maps them onto
/// `ClientError`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    #[error("Project {0} was modified by another session")]
    StaleUpdate(Uuid),

    #[error("An account with email {0} already exists")]
    EmailTaken(String),

    #[error("User {0} not found")]
    UserNotFound(Uuid),
}
