//! Process lifecycle coordination.
//!
//! # Design Decisions
//! - One broadcast channel fans the shutdown signal out to every
//!   long-running task
//! - Tasks finish in-flight work before exiting (graceful drain)

pub mod shutdown;

pub use shutdown::Shutdown;
