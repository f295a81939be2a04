//! HTTP middleware.
//!
//! Request logging with latency tracking; the authentication gate lives in
//! `crate::auth::middleware`.

pub mod logging;

pub use logging::request_logging;
