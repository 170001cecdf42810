//! Route handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::middleware::AuthContext;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::cookies::{append_cookie, CSRF_COOKIE, SESSION_COOKIE};
use crate::session::manager::{IssuedSession, LogoutOutcome};

pub async fn root() -> &'static str {
    "auth-gateway"
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// `POST /auth/login` — credential stand-in: any username is accepted
/// and becomes the session subject.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let issued = match state.sessions.login(&body.username).await {
        Ok(issued) => issued,
        Err(err) => return login_failure(err),
    };
    metrics::record_login("success");

    let mut response = Json(json!({ "message": "Authenticated" })).into_response();
    attach_session_cookies(&mut response, &state, &issued);
    response
}

/// `POST /auth/logout` — blunt clear of whatever session is active.
/// Idempotent: a second call reports there was nothing to do.
pub async fn logout(State(state): State<AppState>) -> Response {
    match state.sessions.logout().await {
        Ok(LogoutOutcome::LoggedOut) => {
            let mut response = Json(json!({ "message": "Logged out" })).into_response();
            let headers = response.headers_mut();
            append_cookie(headers, &state.cookies.removal(SESSION_COOKIE));
            append_cookie(headers, &state.cookies.removal(CSRF_COOKIE));
            response
        }
        Ok(LogoutOutcome::AlreadyLoggedOut) => {
            Json(json!({ "message": "Already logged out" })).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// `GET /auth/google` — send the browser to the provider.
pub async fn oauth_start(State(state): State<AppState>) -> Response {
    let nonce = new_state_nonce();
    match state.identity.authorize_url(&nonce) {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Could not build authorize URL");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Identity provider misconfigured" })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// `GET /auth/google/callback` — finish the exchange and open the
/// session for the identity the provider vouched for.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallback>,
) -> Response {
    let (Some(code), Some(_state)) = (params.code, params.state) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Missing code or state" })),
        )
            .into_response();
    };

    let subject = match state.identity.resolve_subject(&code).await {
        Ok(subject) => subject,
        Err(err) => {
            tracing::error!(error = %err, "Identity provider exchange failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": "Identity provider error" })),
            )
                .into_response();
        }
    };

    let issued = match state.sessions.login(&subject).await {
        Ok(issued) => issued,
        Err(err) => return login_failure(err),
    };
    metrics::record_login("success");

    let mut response = Redirect::to("/auth/success").into_response();
    attach_session_cookies(&mut response, &state, &issued);
    response
}

pub async fn oauth_success() -> Json<Value> {
    Json(json!({ "message": "you're authenticated!" }))
}

/// Protected handler behind the full guard chain.
pub async fn protected(Extension(ctx): Extension<AuthContext>) -> Json<Value> {
    Json(json!({ "message": "Protected route", "subject": ctx.subject }))
}

/// `POST /webhook` — remember the delivery, acknowledge it.
pub async fn webhook_receive(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    tracing::debug!("Webhook delivery received");
    state.webhook.record(payload);
    Json(json!({ "message": "Webhook received!" }))
}

/// `GET /webhook` — return the most recent delivery.
pub async fn webhook_latest(State(state): State<AppState>) -> Json<Value> {
    Json(state.webhook.latest())
}

fn login_failure(err: crate::error::GuardError) -> Response {
    if matches!(err, crate::error::GuardError::Conflict) {
        metrics::record_login("conflict");
    }
    err.into_response()
}

fn attach_session_cookies(response: &mut Response, state: &AppState, issued: &IssuedSession) {
    let headers = response.headers_mut();
    append_cookie(headers, &state.cookies.session(&issued.token));
    append_cookie(headers, &state.cookies.csrf(&issued.csrf_secret));
}

fn new_state_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}
