// handlers/protected/mod.rs - /api/* handlers
//
// Handlers taking `AuthUser` require a bearer token; handlers taking
// `Option<AuthUser>` also serve anonymous callers.
pub mod auth;
pub mod celestial_objects;
pub mod maps;
pub mod users;
