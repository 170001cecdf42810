//! HTTP server setup and guard wiring.
//!
//! # Responsibilities
//! - Assemble the subsystems into shared application state
//! - Build the axum Router with the guard chain in order
//! - Serve with graceful shutdown and config hot reload
//!
//! # Guard order
//! Rate limiting wraps everything; the CSRF and session guards wrap
//! only the protected routes. A rejection at any guard short-circuits
//! the request.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::middleware::{csrf_guard, session_guard};
use crate::identity::IdentityClient;
use crate::observability::metrics;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::session::cookies::CookieFactory;
use crate::session::{CsrfGuard, SessionManager, TokenCodec};
use crate::store::memory::MemoryStore;
use crate::store::{SessionStore, StoreHandle};
use crate::webhook::WebhookInbox;

/// Application state injected into handlers and guards.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub csrf: CsrfGuard,
    pub cookies: CookieFactory,
    pub identity: Arc<IdentityClient>,
    pub webhook: Arc<WebhookInbox>,
    codec: Arc<TokenCodec>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Assemble subsystems and the router from configuration, backed by
    /// the in-process store.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Same, but with a caller-supplied store backend (a shared external
    /// service, or a test double).
    pub fn with_store(config: GatewayConfig, store: Arc<dyn SessionStore>) -> Self {
        let handle = StoreHandle::new(store, Duration::from_millis(config.store.call_timeout_ms));
        let codec = Arc::new(TokenCodec::new(&config.signing));
        let sessions = SessionManager::new(
            handle.clone(),
            codec.clone(),
            Duration::from_secs(config.session.ttl_secs),
        );

        let state = AppState {
            sessions,
            csrf: CsrfGuard::new(handle),
            cookies: CookieFactory::new(config.session.cookie_secure, config.session.ttl_secs),
            identity: Arc::new(IdentityClient::new(config.identity_provider.clone())),
            webhook: Arc::new(WebhookInbox::new()),
            codec,
        };

        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let router = build_router(&config, state.clone(), limiter);
        Self { router, state }
    }

    /// Run the server on `listener` until shutdown is signalled.
    ///
    /// `config_updates` delivers validated reloads from the watcher;
    /// only signing keys are applied live, everything else needs a
    /// restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let codec = self.state.codec.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                codec.rotate(&new_config.signing);
                tracing::info!("Applied signing-key rotation from reloaded config");
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the axum router with the guard chain and middleware layers.
fn build_router(config: &GatewayConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
    // Guards added inside-out: session verification runs closest to the
    // handler, the CSRF check just before it.
    let protected: Router<AppState> = Router::new()
        .route(
            "/protected",
            get(handlers::protected).post(handlers::protected),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_guard,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), csrf_guard));

    let auth: Router<AppState> = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/google", get(handlers::oauth_start))
        .route("/google/callback", get(handlers::oauth_callback))
        .route("/success", get(handlers::oauth_success));

    let webhook: Router<AppState> = Router::new().route(
        "/",
        post(handlers::webhook_receive).get(handlers::webhook_latest),
    );

    Router::new()
        .route("/", get(handlers::root))
        .merge(protected)
        .nest("/auth", auth)
        .nest("/webhook", webhook)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(middleware::from_fn(track_requests))
}

/// Outermost layer: count every response and observe its latency.
async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
