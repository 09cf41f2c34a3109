//! Route guard. Decides what a protected view renders from the auth state
//! alone. This is a client-side convenience; the server repeats every
//! check.

use super::session::{AuthState, Session};

pub const ACCESS_DENIED_TITLE: &str = "Access Denied";
pub const ACCESS_DENIED_MESSAGE: &str = "You don't have permission to access this page.";

/// Capability a route requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardOutcome<'a> {
    /// Session resolution still in flight
    Loading,
    /// No session: show the login view
    Login,
    /// Signed in but lacking the admin role
    AccessDenied,
    Granted(&'a Session),
}

impl GuardOutcome<'_> {
    pub fn is_granted(&self) -> bool {
        matches!(self, GuardOutcome::Granted(_))
    }
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn evaluate(auth: &AuthState, access: Access) -> GuardOutcome<'_> {
        if auth.is_loading() {
            return GuardOutcome::Loading;
        }
        let Some(session) = auth.session() else {
            return GuardOutcome::Login;
        };
        if access == Access::Admin && !session.is_admin() {
            return GuardOutcome::AccessDenied;
        }
        GuardOutcome::Granted(session)
    }
}
