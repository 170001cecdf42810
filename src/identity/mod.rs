//! Identity provider integration.
//!
//! The provider is an opaque collaborator: the gateway hands it an
//! authorization code and gets back a stable identifier to use as the
//! session subject. Nothing else about the handshake leaks into the
//! core.

pub mod client;

pub use client::{IdentityClient, IdentityError};
