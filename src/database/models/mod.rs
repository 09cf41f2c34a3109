pub mod project;
pub mod user;

pub use project::{NewProject, Project, ProjectPatch, ProjectPriority, ProjectStatus};
pub use user::{Role, User, UserInfo};

use thiserror::Error;

/// Input that fails a field-level rule. Carries the field name so the
/// HTTP layer can report it in `field_errors`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
