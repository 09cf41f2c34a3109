//! Client side of the tracker: the data-access mirror, auth state, theme
//! flag and route guard, composed by [`Dashboard`] over any
//! [`ProjectBackend`].

pub mod backend;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod http;
pub mod local;
pub mod mirror;
pub mod session;
pub mod theme;

pub use backend::ProjectBackend;
pub use dashboard::Dashboard;
pub use error::ClientError;
pub use guard::{Access, GuardOutcome, RouteGuard};
pub use http::HttpBackend;
pub use local::LocalBackend;
pub use mirror::ProjectMirror;
pub use session::{AuthFailure, AuthState, Session};
pub use theme::Theme;

#[cfg(test)]
mod tests;
