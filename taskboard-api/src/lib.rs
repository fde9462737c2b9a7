//! # Taskboard API Server Library
//!
//! This library provides the HTTP and WebSocket surface of the
//! taskboard.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `mail`: Outbound mail boundary (reset-link emails)
//! - `media`: Media host boundary (avatar uploads)
//! - `routes`: API route handlers and the WebSocket endpoint

pub mod app;
pub mod config;
pub mod error;
pub mod mail;
pub mod media;
pub mod routes;
