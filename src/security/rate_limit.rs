//! Per-client request rate limiting.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::error::GuardError;

/// One client's position in the current fixed window.
struct Window {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request counter keyed by client address.
///
/// Every call counts, including ones that end up rejected, and a
/// rejection neither extends nor resets the window: it re-arms exactly
/// one window length after the call that opened it. Entries are never
/// swept; a stale window resets itself on the next call from that
/// client.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    limit: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            limit: config.max_requests,
            window: Duration::from_millis(config.window_ms),
            enabled: config.enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Count a call from `key` and decide whether it may proceed.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        match windows.get_mut(key) {
            Some(window) if now.duration_since(window.window_start) <= self.window => {
                window.count += 1;
                window.count <= self.limit
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        window_start: now,
                    },
                );
                true
            }
        }
    }
}

/// Guard middleware. Runs before every other guard; a rejected client
/// never reaches the CSRF or session checks.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.enabled() {
        return next.run(request).await;
    }

    let key = addr.ip().to_string();
    if limiter.allow(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        GuardError::RateLimited.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_ms: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_requests,
            window_ms,
        })
    }

    #[test]
    fn threshold_is_inclusive_and_the_next_call_is_rejected() {
        let limiter = limiter(3, 60_000);
        let start = Instant::now();

        for i in 0..3 {
            assert!(
                limiter.allow_at("1.2.3.4", start + Duration::from_millis(i)),
                "call {} should be allowed",
                i + 1
            );
        }
        assert!(!limiter.allow_at("1.2.3.4", start + Duration::from_millis(10)));
    }

    #[test]
    fn window_rearms_strictly_after_its_length() {
        let limiter = limiter(3, 60_000);
        let start = Instant::now();

        for _ in 0..4 {
            limiter.allow_at("1.2.3.4", start);
        }

        // Exactly one window length after the opening call: still closed.
        assert!(!limiter.allow_at("1.2.3.4", start + Duration::from_millis(60_000)));

        // One past the window: reset, the triggering call counting as 1.
        let reopened = start + Duration::from_millis(60_001);
        assert!(limiter.allow_at("1.2.3.4", reopened));
        assert!(limiter.allow_at("1.2.3.4", reopened + Duration::from_millis(1)));
        assert!(limiter.allow_at("1.2.3.4", reopened + Duration::from_millis(2)));
        assert!(!limiter.allow_at("1.2.3.4", reopened + Duration::from_millis(3)));
    }

    #[test]
    fn rejections_do_not_extend_the_window() {
        let limiter = limiter(1, 60_000);
        let start = Instant::now();

        assert!(limiter.allow_at("1.2.3.4", start));
        for i in 1..50 {
            assert!(!limiter.allow_at("1.2.3.4", start + Duration::from_millis(i)));
        }
        assert!(limiter.allow_at("1.2.3.4", start + Duration::from_millis(60_001)));
    }

    #[test]
    fn clients_are_counted_independently() {
        let limiter = limiter(1, 60_000);
        let start = Instant::now();

        assert!(limiter.allow_at("1.2.3.4", start));
        assert!(!limiter.allow_at("1.2.3.4", start));
        assert!(limiter.allow_at("5.6.7.8", start));
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let limiter = Arc::new(limiter(100, 60_000));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            handles.push(std::thread::spawn(move || {
                let mut allowed = 0u32;
                for _ in 0..25 {
                    if limiter.allow_at("1.2.3.4", start) {
                        allowed += 1;
                    }
                }
                allowed
            }));
        }

        let allowed: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // 200 calls against a budget of 100: exactly the budget passes.
        assert_eq!(allowed, 100);
    }
}
