//! Unified guard error taxonomy.
//!
//! # Responsibilities
//! - One error kind per guard failure mode
//! - Uniform conversion into HTTP status + JSON body at the boundary
//!
//! # Design Decisions
//! - Token failures are never distinguished for the caller (no oracle)
//! - Store outages are 5xx, never "no session" (fail closed)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Failures produced by the request guards.
///
/// Every rejection in the pipeline is one of these variants; the HTTP
/// boundary converts them uniformly instead of each guard shaping its
/// own response.
#[derive(Debug, Error)]
pub enum GuardError {
    /// No, invalid, or mismatched session credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// A verified session is already active in the store.
    #[error("Already logged in. Logout from other devices.")]
    Conflict,

    /// Mutating request arrived without a session or CSRF token.
    #[error("Missing CSRF token or session")]
    MissingCsrf,

    /// Supplied CSRF token does not match the bound secret.
    #[error("Invalid CSRF token")]
    InvalidCsrf,

    /// Client exhausted its fixed-window request budget.
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited,

    /// The backing store is unreachable or timed out.
    #[error("Service temporarily unavailable")]
    StoreUnavailable,

    /// Unexpected server-side failure (e.g. credential signing).
    #[error("Internal server error")]
    Internal,
}

impl GuardError {
    fn status(&self) -> StatusCode {
        match self {
            GuardError::Unauthorized | GuardError::Conflict => StatusCode::UNAUTHORIZED,
            GuardError::MissingCsrf | GuardError::InvalidCsrf => StatusCode::FORBIDDEN,
            GuardError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GuardError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            GuardError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GuardError::Unauthorized => "unauthorized",
            GuardError::Conflict => "conflict",
            GuardError::MissingCsrf => "csrf_missing",
            GuardError::InvalidCsrf => "csrf_invalid",
            GuardError::RateLimited => "rate_limited",
            GuardError::StoreUnavailable => "store_unavailable",
            GuardError::Internal => "internal",
        }
    }
}

impl From<StoreError> for GuardError {
    fn from(_: StoreError) -> Self {
        GuardError::StoreUnavailable
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        crate::observability::metrics::record_guard_rejection(self.kind());
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_guard_contract() {
        assert_eq!(GuardError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GuardError::Conflict.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GuardError::MissingCsrf.status(), StatusCode::FORBIDDEN);
        assert_eq!(GuardError::InvalidCsrf.status(), StatusCode::FORBIDDEN);
        assert_eq!(GuardError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(GuardError::StoreUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn store_failure_is_never_unauthorized() {
        let err: GuardError = StoreError::Timeout.into();
        assert!(matches!(err, GuardError::StoreUnavailable));
    }

    #[test]
    fn messages_are_the_documented_bodies() {
        assert_eq!(GuardError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            GuardError::Conflict.to_string(),
            "Already logged in. Logout from other devices."
        );
        assert_eq!(
            GuardError::MissingCsrf.to_string(),
            "Missing CSRF token or session"
        );
        assert_eq!(GuardError::InvalidCsrf.to_string(), "Invalid CSRF token");
        assert_eq!(
            GuardError::RateLimited.to_string(),
            "Rate limit exceeded. Try again later."
        );
    }
}
