//! Double-submit CSRF validation.

use axum::http::{HeaderMap, Method, Uri};

use crate::error::GuardError;
use crate::session::manager::csrf_key;
use crate::store::StoreHandle;

/// Header the client echoes the secret back on.
pub const CSRF_HEADER: &str = "x-csrf-token";
/// Accepted fallback header.
pub const CSRF_HEADER_FALLBACK: &str = "csrf-token";
/// Accepted fallback query parameter.
pub const CSRF_QUERY_PARAM: &str = "csrf_token";

/// Validates request-supplied CSRF tokens against the secret bound to
/// the caller's session at issuance time.
#[derive(Clone)]
pub struct CsrfGuard {
    store: StoreHandle,
}

impl CsrfGuard {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Only create/update/delete-class verbs need the token.
    pub fn protects(method: &Method) -> bool {
        matches!(
            *method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        )
    }

    /// Check a mutating request's CSRF token against the session binding.
    pub async fn validate(
        &self,
        session_token: Option<&str>,
        presented: Option<&str>,
    ) -> Result<(), GuardError> {
        let (session_token, presented) = match (session_token, presented) {
            (Some(session_token), Some(presented)) => (session_token, presented),
            _ => return Err(GuardError::MissingCsrf),
        };

        let bound = self
            .store
            .get(&csrf_key(session_token))
            .await?
            .ok_or(GuardError::InvalidCsrf)?;
        if bound != presented {
            return Err(GuardError::InvalidCsrf);
        }
        Ok(())
    }
}

/// Pull the caller-supplied CSRF token out of a request: the primary
/// header wins, then the fallback header, then the query parameter.
pub fn presented_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(CSRF_HEADER)
        .or_else(|| headers.get(CSRF_HEADER_FALLBACK))
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            let query = uri.query()?;
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == CSRF_QUERY_PARAM)
                .map(|(_, value)| value.into_owned())
        })
}
