//! Session credential signing and verification.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SigningConfig;

/// Credential errors.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, expiry, or format check failed. Deliberately never
    /// more specific: callers must not learn why a token was rejected.
    #[error("invalid session token")]
    Invalid,

    /// A new credential could not be signed.
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

/// Claims carried by the session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated identity.
    pub sub: String,
    /// Unique credential id. Keeps two logins for the same subject in
    /// the same second from minting byte-identical tokens.
    pub jti: String,
    /// Issued-at, seconds since the epoch.
    pub iat: u64,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
}

struct KeyRing {
    encoding: EncodingKey,
    decoding: Vec<DecodingKey>,
}

impl KeyRing {
    fn from_config(signing: &SigningConfig) -> Self {
        let mut decoding = vec![DecodingKey::from_secret(signing.secret.as_bytes())];
        if let Some(previous) = &signing.previous_secret {
            decoding.push(DecodingKey::from_secret(previous.as_bytes()));
        }
        Self {
            encoding: EncodingKey::from_secret(signing.secret.as_bytes()),
            decoding,
        }
    }
}

/// Signs and verifies session credentials (HS256).
///
/// The signing key is injected configuration, never a literal. The key
/// ring is swappable at runtime: rotation installs a new current key
/// while the previous one stays accepted for verification until the
/// next rotation drops it.
pub struct TokenCodec {
    keys: ArcSwap<KeyRing>,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(signing: &SigningConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            keys: ArcSwap::from_pointee(KeyRing::from_config(signing)),
            validation,
        }
    }

    /// Issue a signed credential for `subject` expiring `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys.load().encoding,
        )
        .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Check signature and expiry; return the claims only if both hold.
    ///
    /// Malformed, expired, and bad-signature tokens all produce the same
    /// [`TokenError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let keys = self.keys.load();
        for key in &keys.decoding {
            if let Ok(data) = decode::<SessionClaims>(token, key, &self.validation) {
                return Ok(data.claims);
            }
        }
        Err(TokenError::Invalid)
    }

    /// Install a new key ring.
    ///
    /// Tokens signed with the previous key keep verifying for as long as
    /// the new config lists it in `previous_secret`.
    pub fn rotate(&self, signing: &SigningConfig) {
        self.keys.store(Arc::new(KeyRing::from_config(signing)));
        tracing::info!(
            grace_key = signing.previous_secret.is_some(),
            "Signing keys rotated"
        );
    }
}
