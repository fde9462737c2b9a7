//! # Taskboard Shared Library
//!
//! This crate contains the core of the taskboard system: the data
//! models, the authentication and token primitives, the real-time
//! connection registry with its broadcast dispatcher, and the task
//! service that couples persistence to live notification.
//!
//! ## Module Organization
//!
//! - `models`: Database models and read projections
//! - `auth`: Session credentials, password hashing, reset tokens
//! - `events`: Domain events broadcast to live connections
//! - `realtime`: Connection registry, dispatcher, heartbeat
//! - `tasks`: Task service (mutate, re-read, publish)
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod events;
pub mod models;
pub mod realtime;
pub mod tasks;

/// Current version of the taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
