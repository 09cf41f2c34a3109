// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which inserts the
// caller as an `AuthUser` request extension. Ownership checks happen in
// `ProjectService`, not in the handlers.

pub mod auth; // /api/auth/*
pub mod projects; // /api/projects/*
