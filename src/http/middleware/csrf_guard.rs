//! CSRF guard for mutating verbs.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::session::cookies::{read_cookie, SESSION_COOKIE};
use crate::session::csrf::{presented_token, CsrfGuard};

/// Check the double-submit token on create/update/delete-class
/// requests; read-only verbs pass through untouched.
pub async fn csrf_guard(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !CsrfGuard::protects(request.method()) {
        return next.run(request).await;
    }

    let session_token = read_cookie(request.headers(), SESSION_COOKIE);
    let presented = presented_token(request.headers(), request.uri());
    match state
        .csrf
        .validate(session_token.as_deref(), presented.as_deref())
        .await
    {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}
