//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use auth_gateway::config::GatewayConfig;
use auth_gateway::http::HttpServer;
use auth_gateway::lifecycle::Shutdown;

/// Test configuration: known signing secret, plain-HTTP cookies, and a
/// rate limit generous enough not to interfere unless a test tightens
/// it.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.signing.secret = "integration-test-signing-secret".into();
    config.session.cookie_secure = false;
    config.rate_limit.max_requests = 1_000;
    config
}

/// Boot the gateway on an ephemeral port. Returns its address and the
/// shutdown handle that keeps it alive.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (_updates_tx, updates_rx) = mpsc::unbounded_channel();

    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that never follows redirects; tests inspect them directly.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// Extract a cookie's value from a response's `Set-Cookie` headers.
pub fn cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    set_cookie_header(response, name).map(|raw| {
        let (pair, _) = raw.split_once(';').unwrap_or((raw.as_str(), ""));
        pair.split_once('=').map(|(_, v)| v.to_string()).unwrap_or_default()
    })
}

/// The full raw `Set-Cookie` header for `name`, attributes included.
#[allow(dead_code)]
pub fn set_cookie_header(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|raw| {
            raw.split_once('=')
                .map(|(cookie_name, _)| cookie_name == name)
                .unwrap_or(false)
        })
        .map(str::to_string)
}

/// Minimal mock identity provider: answers the token exchange on POST
/// and the profile fetch on GET, always for the same test identity.
#[allow(dead_code)]
pub async fn start_mock_identity_provider() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]);
                let body = if head.starts_with("POST") {
                    r#"{"access_token":"mock-access-token"}"#
                } else {
                    r#"{"email":"oauth-user@example.com"}"#
                };
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
