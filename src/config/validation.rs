//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject configs that would run without a signing key
//! - Validate value ranges (windows > 0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function over the parsed config

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a config.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address is not a valid socket address: {0}")]
    BadBindAddress(String),

    #[error("signing.secret must be set (config file or AUTH_GATEWAY_SIGNING_SECRET)")]
    MissingSigningSecret,

    #[error("session.ttl_secs must be greater than zero")]
    ZeroSessionTtl,

    #[error("rate_limit.max_requests must be greater than zero")]
    ZeroRateLimit,

    #[error("rate_limit.window_ms must be greater than zero")]
    ZeroRateWindow,

    #[error("store.call_timeout_ms must be greater than zero")]
    ZeroStoreTimeout,

    #[error("identity_provider.{0} is not a valid URL: {1}")]
    BadProviderUrl(&'static str, String),
}

/// Semantic checks on a parsed config. Collects every failure rather
/// than stopping at the first.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.signing.secret.is_empty() {
        errors.push(ValidationError::MissingSigningSecret);
    }

    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::ZeroSessionTtl);
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::ZeroRateLimit);
        }
        if config.rate_limit.window_ms == 0 {
            errors.push(ValidationError::ZeroRateWindow);
        }
    }

    if config.store.call_timeout_ms == 0 {
        errors.push(ValidationError::ZeroStoreTimeout);
    }

    let provider = &config.identity_provider;
    for (field, value) in [
        ("auth_url", &provider.auth_url),
        ("token_url", &provider.token_url),
        ("profile_url", &provider.profile_url),
    ] {
        if !value.is_empty() && Url::parse(value).is_err() {
            errors.push(ValidationError::BadProviderUrl(field, value.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
