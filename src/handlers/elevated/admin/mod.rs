// handlers/elevated/admin/mod.rs - Cross-user views

pub mod stats; // GET /api/admin/stats
pub mod users; // GET /api/admin/users

pub use stats::admin_stats;
pub use users::admin_users;
