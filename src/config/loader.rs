//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Env var that overrides `signing.secret`.
pub const SIGNING_SECRET_ENV: &str = "AUTH_GATEWAY_SIGNING_SECRET";
/// Env var that overrides `signing.previous_secret`.
pub const SIGNING_SECRET_PREVIOUS_ENV: &str = "AUTH_GATEWAY_SIGNING_SECRET_PREVIOUS";
/// Env var that overrides `identity_provider.client_secret`.
pub const OAUTH_CLIENT_SECRET_ENV: &str = "AUTH_GATEWAY_OAUTH_CLIENT_SECRET";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML config file, overlay secrets from the environment, and
/// validate the result.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GatewayConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Secrets come from the environment when present; the file only needs
/// them for local development.
pub fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(secret) = env::var(SIGNING_SECRET_ENV) {
        config.signing.secret = secret;
    }
    if let Ok(previous) = env::var(SIGNING_SECRET_PREVIOUS_ENV) {
        config.signing.previous_secret = Some(previous);
    }
    if let Ok(secret) = env::var(OAUTH_CLIENT_SECRET_ENV) {
        config.identity_provider.client_secret = secret;
    }
}
