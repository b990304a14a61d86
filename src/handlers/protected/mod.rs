// handlers/protected/mod.rs - Protected handlers (session required)
//
// Every handler here receives the `AuthUser` injected by the session
// middleware and passes the caller id to the gateway, which scopes each
// query to sites the caller owns.
//
// Security Level: Session (JWT bearer or session cookie)
// Route Prefix: /api/*

pub mod auth; // Session inspection
pub mod plan; // Plan CRUD on a single endpoint, routed by method

pub use auth::session_whoami;
