//! Owner-or-admin access policy.
//!
//! Every project read and write goes through these checks; the stores
//! themselves are policy-free.

use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Project, Role};
use crate::types::Operation;

/// The authenticated caller as the policy sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// Non-owners get the same answer as for a missing record
    #[error("Project {0} not found")]
    Hidden(Uuid),

    #[error("Administrator access required")]
    AdminRequired,
}

/// Owner filter for list queries: admins see every owner
pub fn list_scope(actor: &Actor) -> Option<Uuid> {
    if actor.is_admin() {
        None
    } else {
        Some(actor.id)
    }
}

pub fn can_access(actor: &Actor, project: &Project, _op: Operation) -> bool {
    actor.is_admin() || project.is_owned_by(actor.id)
}

pub fn authorize(actor: &Actor, project: &Project, op: Operation) -> Result<(), PolicyError> {
    if can_access(actor, project, op) {
        Ok(())
    } else {
        tracing::warn!(
            actor = %actor.id,
            project = %project.id,
            operation = %op,
            "Access denied by owner-or-admin policy"
        );
        Err(PolicyError::Hidden(project.id))
    }
}

pub fn require_admin(actor: &Actor) -> Result<(), PolicyError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(PolicyError::AdminRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewProject;
    use chrono::Utc;

    #[test]
    fn owner_and_admin_pass_others_are_hidden() {
        let owner = Actor::new(Uuid::new_v4(), Role::User);
        let stranger = Actor::new(Uuid::new_v4(), Role::User);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let project = Project::from_new(NewProject::new("p"), owner.id, Utc::now()).unwrap();

        for op in [Operation::Select, Operation::Update, Operation::Delete] {
            assert!(authorize(&owner, &project, op).is_ok());
            assert!(authorize(&admin, &project, op).is_ok());
            assert_eq!(authorize(&stranger, &project, op), Err(PolicyError::Hidden(project.id)));
        }
    }

    #[test]
    fn list_scope_is_unbounded_only_for_admins() {
        let user = Actor::new(Uuid::new_v4(), Role::User);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        assert_eq!(list_scope(&user), Some(user.id));
        assert_eq!(list_scope(&admin), None);
        assert_eq!(require_admin(&user), Err(PolicyError::AdminRequired));
        assert!(require_admin(&admin).is_ok());
    }
}
