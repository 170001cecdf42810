//! Shared session-state storage.
//!
//! # Data Flow
//! ```text
//! SessionManager / CsrfGuard
//!     → StoreHandle (bounded timeout per call)
//!     → dyn SessionStore (memory backend, or a shared external
//!       key-value service in multi-instance deployments)
//! ```
//!
//! # Design Decisions
//! - `set_if_absent` is a store capability, not an afterthought: the
//!   login race is closed here, not with in-process locks
//! - A timed-out call is a store failure, never "key absent"

pub mod memory;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is unreachable or rejected the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured deadline.
    #[error("store call timed out")]
    Timeout,
}

/// Key-value contract shared by all session-state backends.
///
/// Requests may be handled by independent processes sharing the same
/// store, so read-decide-write sequences cannot be protected by
/// in-process locks; `set_if_absent` must be a single atomic operation
/// in every backend.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write `value` only if `key` currently has no value.
    ///
    /// Returns `true` if the write happened, `false` if another value
    /// was already present.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Store accessor imposing a bounded timeout on every call.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<dyn SessionStore>,
    call_timeout: Duration,
}

impl StoreHandle {
    pub fn new(inner: Arc<dyn SessionStore>, call_timeout: Duration) -> Self {
        Self {
            inner,
            call_timeout,
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.timed("get", key, self.inner.get(key)).await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.timed("set", key, self.inner.set(key, value)).await
    }

    pub async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        self.timed("set_if_absent", key, self.inner.set_if_absent(key, value))
            .await
    }

    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.timed("delete", key, self.inner.delete(key)).await
    }

    async fn timed<T>(
        &self,
        op: &'static str,
        key: &str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => {
                if let Err(err) = &result {
                    tracing::error!(op, key, error = %err, "Store call failed");
                }
                result
            }
            Err(_) => {
                tracing::error!(
                    op,
                    key,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(StoreError::Timeout)
            }
        }
    }
}
