//! Session lifecycle orchestration.

use std::sync::Arc;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::GuardError;
use crate::session::token::{SessionClaims, TokenCodec};
use crate::store::StoreHandle;

/// Store key holding the single current session token.
///
/// A single global slot: the whole service supports one active session
/// system-wide. Keying this by identity is the extension point for
/// multi-user deployments.
pub const SESSION_KEY: &str = "session";

/// Store key binding a CSRF secret to a session token.
pub fn csrf_key(token: &str) -> String {
    format!("csrf:{token}")
}

/// Credentials minted by a successful login.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub csrf_secret: String,
}

/// Outcome of a logout call.
#[derive(Debug, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    AlreadyLoggedOut,
}

/// Orchestrates login, logout, and verification for the current-session
/// slot. Sessions are never mutated in place: invalidation is always a
/// delete, optionally followed by a fresh create.
#[derive(Clone)]
pub struct SessionManager {
    store: StoreHandle,
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: StoreHandle, codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        Self { store, codec, ttl }
    }

    /// Issue a new session for `subject`.
    ///
    /// An active session is never silently taken over; the caller gets
    /// [`GuardError::Conflict`] and must log out elsewhere first. The
    /// slot itself is claimed with a conditional write, so a concurrent
    /// login that raced past the initial read still loses here instead
    /// of clobbering the winner.
    pub async fn login(&self, subject: &str) -> Result<IssuedSession, GuardError> {
        if let Some(existing) = self.store.get(SESSION_KEY).await? {
            if self.codec.verify(&existing).is_ok() {
                return Err(GuardError::Conflict);
            }
            // Expired or corrupt leftover: clean it up and fall through.
            self.store.delete(&csrf_key(&existing)).await?;
            self.store.delete(SESSION_KEY).await?;
        }

        let token = self.codec.issue(subject, self.ttl).map_err(|err| {
            tracing::error!(error = %err, "Could not sign session token");
            GuardError::Internal
        })?;
        let csrf_secret = new_csrf_secret();

        if !self.store.set_if_absent(SESSION_KEY, &token).await? {
            return Err(GuardError::Conflict);
        }
        if let Err(err) = self.store.set(&csrf_key(&token), &csrf_secret).await {
            // Roll the half-created session back rather than leave the
            // slot live without a CSRF binding.
            let _ = self.store.delete(SESSION_KEY).await;
            return Err(err.into());
        }

        tracing::info!(subject, "Session issued");
        Ok(IssuedSession { token, csrf_secret })
    }

    /// Clear whatever session is active. Idempotent.
    pub async fn logout(&self) -> Result<LogoutOutcome, GuardError> {
        match self.store.get(SESSION_KEY).await? {
            None => Ok(LogoutOutcome::AlreadyLoggedOut),
            Some(token) => {
                self.store.delete(&csrf_key(&token)).await?;
                self.store.delete(SESSION_KEY).await?;
                tracing::info!("Session cleared");
                Ok(LogoutOutcome::LoggedOut)
            }
        }
    }

    /// Check a presented credential against the stored session.
    ///
    /// The byte-for-byte comparison against the stored token is what
    /// enforces the single-device policy: a credential from an older
    /// login no longer matches the slot once a new one is issued.
    pub async fn verify(&self, presented: Option<&str>) -> Result<SessionClaims, GuardError> {
        let presented = presented.ok_or(GuardError::Unauthorized)?;
        let stored = self
            .store
            .get(SESSION_KEY)
            .await?
            .ok_or(GuardError::Unauthorized)?;
        if stored != presented {
            return Err(GuardError::Unauthorized);
        }
        match self.codec.verify(&stored) {
            Ok(claims) => Ok(claims),
            Err(_) => {
                // The stored credential no longer verifies; drop it so
                // the next login starts from an empty slot.
                self.store.delete(&csrf_key(&stored)).await?;
                self.store.delete(SESSION_KEY).await?;
                Err(GuardError::Unauthorized)
            }
        }
    }
}

fn new_csrf_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningConfig;
    use crate::store::memory::MemoryStore;
    use crate::store::{SessionStore, StoreError};
    use async_trait::async_trait;

    fn manager_with_store() -> (SessionManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let handle = StoreHandle::new(store.clone(), Duration::from_millis(200));
        let codec = Arc::new(TokenCodec::new(&SigningConfig {
            secret: "manager-test-secret".into(),
            previous_secret: None,
        }));
        (
            SessionManager::new(handle, codec, Duration::from_secs(3600)),
            store,
        )
    }

    #[tokio::test]
    async fn login_then_verify_yields_the_identity() {
        let (manager, _) = manager_with_store();
        let issued = manager.login("alice@example.com").await.unwrap();
        let claims = manager.verify(Some(&issued.token)).await.unwrap();
        assert_eq!(claims.sub, "alice@example.com");
    }

    #[tokio::test]
    async fn second_login_conflicts_while_the_first_stays_live() {
        let (manager, _) = manager_with_store();
        let first = manager.login("alice").await.unwrap();

        let second = manager.login("bob").await;
        assert!(matches!(second, Err(GuardError::Conflict)));

        // Same identity conflicts too.
        let again = manager.login("alice").await;
        assert!(matches!(again, Err(GuardError::Conflict)));

        assert!(manager.verify(Some(&first.token)).await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_logins_have_exactly_one_winner() {
        let (manager, store) = manager_with_store();

        let mut handles = Vec::new();
        for i in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.login(&format!("user-{i}")).await
            }));
        }

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(issued) => winners.push(issued),
                Err(err) => assert!(matches!(err, GuardError::Conflict)),
            }
        }

        assert_eq!(winners.len(), 1);
        let stored = store.get(SESSION_KEY).await.unwrap().unwrap();
        assert_eq!(stored, winners[0].token);
        let bound = store.get(&csrf_key(&stored)).await.unwrap().unwrap();
        assert_eq!(bound, winners[0].csrf_secret);
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_kills_the_old_token() {
        let (manager, _) = manager_with_store();
        let issued = manager.login("alice").await.unwrap();

        assert_eq!(manager.logout().await.unwrap(), LogoutOutcome::LoggedOut);
        assert_eq!(
            manager.logout().await.unwrap(),
            LogoutOutcome::AlreadyLoggedOut
        );

        let verdict = manager.verify(Some(&issued.token)).await;
        assert!(matches!(verdict, Err(GuardError::Unauthorized)));
    }

    #[tokio::test]
    async fn logout_removes_the_csrf_binding() {
        let (manager, store) = manager_with_store();
        let issued = manager.login("alice").await.unwrap();
        manager.logout().await.unwrap();
        assert!(store
            .get(&csrf_key(&issued.token))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn corrupt_leftover_session_is_cleaned_up_on_login() {
        let (manager, store) = manager_with_store();
        store.set(SESSION_KEY, "garbage-token").await.unwrap();
        store.set(&csrf_key("garbage-token"), "stale").await.unwrap();

        let issued = manager.login("alice").await.unwrap();
        assert!(manager.verify(Some(&issued.token)).await.is_ok());
        assert!(store
            .get(&csrf_key("garbage-token"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn verify_rejects_a_token_that_is_not_the_stored_one() {
        let (manager, _) = manager_with_store();
        let issued = manager.login("alice").await.unwrap();

        let verdict = manager.verify(Some("some-other-token")).await;
        assert!(matches!(verdict, Err(GuardError::Unauthorized)));

        // The real credential still works.
        assert!(manager.verify(Some(&issued.token)).await.is_ok());
    }

    #[tokio::test]
    async fn verify_without_a_credential_is_unauthorized() {
        let (manager, _) = manager_with_store();
        manager.login("alice").await.unwrap();
        assert!(matches!(
            manager.verify(None).await,
            Err(GuardError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn verify_purges_an_expired_stored_session() {
        let store = Arc::new(MemoryStore::new());
        let handle = StoreHandle::new(store.clone(), Duration::from_millis(200));
        let codec = Arc::new(TokenCodec::new(&SigningConfig {
            secret: "manager-test-secret".into(),
            previous_secret: None,
        }));
        let manager = SessionManager::new(handle, codec.clone(), Duration::from_secs(3600));

        // A token the codec no longer accepts, planted as the session.
        let foreign = TokenCodec::new(&SigningConfig {
            secret: "some-other-secret".into(),
            previous_secret: None,
        })
        .issue("alice", Duration::from_secs(3600))
        .unwrap();
        store.set(SESSION_KEY, &foreign).await.unwrap();
        store.set(&csrf_key(&foreign), "bound").await.unwrap();

        let verdict = manager.verify(Some(&foreign)).await;
        assert!(matches!(verdict, Err(GuardError::Unauthorized)));
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
        assert!(store.get(&csrf_key(&foreign)).await.unwrap().is_none());
    }

    /// Backend that always fails; the manager must surface the outage,
    /// never treat it as "no session".
    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn set_if_absent(&self, _key: &str, _value: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn store_outage_fails_closed() {
        let handle = StoreHandle::new(Arc::new(BrokenStore), Duration::from_millis(200));
        let codec = Arc::new(TokenCodec::new(&SigningConfig {
            secret: "manager-test-secret".into(),
            previous_secret: None,
        }));
        let manager = SessionManager::new(handle, codec, Duration::from_secs(3600));

        assert!(matches!(
            manager.login("alice").await,
            Err(GuardError::StoreUnavailable)
        ));
        assert!(matches!(
            manager.verify(Some("tok")).await,
            Err(GuardError::StoreUnavailable)
        ));
        assert!(matches!(
            manager.logout().await,
            Err(GuardError::StoreUnavailable)
        ));
    }
}
