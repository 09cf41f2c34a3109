// handlers/protected/projects/mod.rs - Project CRUD and statistics
//
// Collection routes:  GET/POST /api/projects, GET /api/projects/stats
// Record routes:      GET/PATCH/PUT/DELETE /api/projects/:id

pub mod collection;
pub mod record;

pub use collection::{project_create, project_list, project_stats};
pub use record::{project_delete, project_get, project_update};
