//! Session verification guard.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::session::cookies::{read_cookie, SESSION_COOKIE};

/// Identity attached to requests that passed session verification.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub subject: String,
}

/// Reject the request unless the presented credential matches the live
/// session and still verifies.
pub async fn session_guard(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let presented = read_cookie(request.headers(), SESSION_COOKIE);
    match state.sessions.verify(presented.as_deref()).await {
        Ok(claims) => {
            request.extensions_mut().insert(AuthContext {
                subject: claims.sub,
            });
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
