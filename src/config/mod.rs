//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, overlay secrets from environment)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared with all subsystems at startup
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads + validates new config
//!     → server applies the hot-reloadable subset
//!       (signing-key rotation); the rest needs a restart
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Secrets are injected (file or environment), never literals
//! - A bad reload is dropped; the running config stays in effect

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::{
    GatewayConfig, IdentityProviderConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    SessionConfig, SigningConfig, StoreConfig, TimeoutConfig,
};
