//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging; request ID flows through all subsystems
//! - Metric updates are cheap atomic operations
//! - Guard rejections are counted in one place, at the error boundary

pub mod logging;
pub mod metrics;
