//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → security::rate_limit (per-client fixed window)
//!     → http::middleware::csrf_guard (mutating verbs only)
//!     → http::middleware::session_guard (credential vs. stored session)
//!     → handler
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::HttpServer;
