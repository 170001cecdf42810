//! Request-security gateway library.
//!
//! Enforces three cross-cutting guarantees in front of protected
//! handlers: at most one active session backed by a signed expiring
//! credential, double-submit CSRF protection bound to that session, and
//! per-client fixed-window rate limiting.

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod session;
pub mod store;
pub mod webhook;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
