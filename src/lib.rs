//! LinkPress Backend Library
//!
//! Exposes core modules for use by the server binary and integration tests.

pub mod api;
pub mod app;
pub mod auth;
pub mod errors;
pub mod messages;
pub mod middleware;
pub mod store;
