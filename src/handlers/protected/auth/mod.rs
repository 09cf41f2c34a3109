// handlers/protected/auth/mod.rs - Session management for authenticated users

pub mod session;

pub use session::{session_logout, session_whoami};
