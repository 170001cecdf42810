//! Thin client for the three-legged token exchange.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::IdentityProviderConfig;

/// Failures talking to the identity provider. Fatal to the request
/// that triggered them; no session is minted on any of these.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("authorize URL could not be built: {0}")]
    BadAuthorizeUrl(#[from] url::ParseError),

    #[error("token exchange failed: provider answered {0}")]
    Exchange(u16),

    #[error("profile fetch failed: provider answered {0}")]
    Profile(u16),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Profile {
    email: String,
}

/// HTTP client for the identity provider endpoints.
pub struct IdentityClient {
    http: reqwest::Client,
    config: IdentityProviderConfig,
}

impl IdentityClient {
    pub fn new(config: IdentityProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Provider URL the login flow redirects the browser to.
    pub fn authorize_url(&self, state: &str) -> Result<Url, IdentityError> {
        let mut url = Url::parse(&self.config.auth_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchange an authorization code for the identity it authenticates.
    pub async fn resolve_subject(&self, code: &str) -> Result<String, IdentityError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_email(&access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<String, IdentityError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Exchange(response.status().as_u16()));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_email(&self, access_token: &str) -> Result<String, IdentityError> {
        let response = self
            .http
            .get(&self.config.profile_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Profile(response.status().as_u16()));
        }
        let profile: Profile = response.json().await?;
        Ok(profile.email)
    }
}
