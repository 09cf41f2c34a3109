// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Routes under /api/admin/* pass through `jwt_auth_middleware` and then
// `require_admin_middleware`; non-admin sessions get 403.

pub mod admin;
