/// HTTP and WebSocket route handlers
///
/// Each submodule groups the handlers for one mounted prefix. Handlers
/// stay thin: they validate input at the boundary, call into the shared
/// services, and map outcomes through [`crate::error::ApiError`].

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
pub mod ws;
