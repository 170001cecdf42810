//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! login:   handler → SessionManager::login
//!              → TokenCodec::issue
//!              → store.set_if_absent("session", token)
//!              → store.set("csrf:<token>", secret)
//!
//! verify:  session guard → SessionManager::verify
//!              → store.get("session") + byte-compare
//!              → TokenCodec::verify
//!
//! csrf:    csrf guard → CsrfGuard::validate
//!              → store.get("csrf:<token>") + exact match
//! ```
//!
//! # Design Decisions
//! - One global session slot; login never silently takes over a live one
//! - The slot is claimed with a conditional write, not read-then-write
//! - Credentials travel as cookies; only the CSRF secret is readable
//!   client-side

pub mod cookies;
pub mod csrf;
pub mod manager;
pub mod token;

pub use csrf::CsrfGuard;
pub use manager::{IssuedSession, LogoutOutcome, SessionManager};
pub use token::{SessionClaims, TokenCodec};
