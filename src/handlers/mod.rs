// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) → Protected (JWT auth) → Elevated (JWT auth + admin role).
// Routing and middleware for each tier live in `crate::app`.

pub mod elevated; // /api/admin/*
pub mod protected; // /api/*
pub mod public; // /, /health, /auth/*
