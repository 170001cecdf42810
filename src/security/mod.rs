//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client fixed window)
//!     → http::middleware (CSRF, then session verification)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - A store outage is never treated as "no session" or "no counter"
//! - No trust in client input

pub mod rate_limit;

pub use rate_limit::RateLimiter;
