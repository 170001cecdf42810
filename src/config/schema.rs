//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config
//! files. Every field has a default so a minimal config works.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Session lifetime and cookie transport.
    pub session: SessionConfig,

    /// Token signing keys. See [`SigningConfig`] for rotation.
    pub signing: SigningConfig,

    /// Per-client request rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Session store behavior.
    pub store: StoreConfig,

    /// Identity provider endpoints and credentials.
    pub identity_provider: IdentityProviderConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Session lifetime and cookie transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Credential lifetime in seconds.
    pub ttl_secs: u64,

    /// Mark credential cookies Secure. Disable only for local
    /// plain-HTTP development.
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            cookie_secure: true,
        }
    }
}

/// Token signing keys.
///
/// The secret is injected configuration (file or environment), never a
/// literal in code. Rotation: move the old secret to `previous_secret`
/// and put the new one in `secret`; tokens signed with the old key stay
/// verifiable until the next rotation drops it.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SigningConfig {
    /// Current signing key. Overridable via `AUTH_GATEWAY_SIGNING_SECRET`.
    pub secret: String,

    /// Previous signing key, still accepted for verification.
    pub previous_secret: Option<String>,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable the per-client fixed-window limiter.
    pub enabled: bool,

    /// Requests allowed per window.
    pub max_requests: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 3,
            window_ms: 60_000,
        }
    }
}

/// Session store behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Deadline for any single store call, in milliseconds. A call past
    /// the deadline is a store failure, not an empty read.
    pub call_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 2_000,
        }
    }
}

/// Identity provider endpoints and credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityProviderConfig {
    /// OAuth client id.
    pub client_id: String,

    /// OAuth client secret. Overridable via
    /// `AUTH_GATEWAY_OAUTH_CLIENT_SECRET`.
    pub client_secret: String,

    /// Browser-facing authorization endpoint.
    pub auth_url: String,

    /// Code-for-token exchange endpoint.
    pub token_url: String,

    /// Profile endpoint answering with the stable identifier.
    pub profile_url: String,

    /// Callback URL registered with the provider.
    pub redirect_uri: String,

    /// Scopes requested during the handshake.
    pub scope: String,
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            profile_url: "https://www.googleapis.com/oauth2/v1/userinfo".to_string(),
            redirect_uri: "http://localhost:3000/auth/google/callback".to_string(),
            scope: "https://www.googleapis.com/auth/userinfo.profile https://www.googleapis.com/auth/userinfo.email".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
