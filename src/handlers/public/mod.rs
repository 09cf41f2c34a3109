// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus service info and health. Inputs arrive without a
// trusted user context, so every field is validated by the services.

pub mod auth;
pub mod system;

pub use system::{health, root};
