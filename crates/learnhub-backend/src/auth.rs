//! Auth endpoints: sign-up, sign-in, sign-out, and token refresh.
//!
//! Speaks the GoTrue HTTP API under `/auth/v1`. Successful auth mutations and
//! refreshes persist the session through the `SessionStore` and broadcast a
//! `SessionChange` so the identity synchronizer can re-resolve.

use crate::client::SupabaseBackend;
use crate::error::{BackendError, BackendResult};
use crate::session::{Session, SessionChange};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Configuration for retry behavior during token refresh.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RefreshConfig {
    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let delay_ms = self.initial_delay_ms.saturating_mul(2u64.pow(attempt));
        let capped_ms = delay_ms.min(self.max_delay_ms);
        std::time::Duration::from_millis(capped_ms)
    }
}

/// Token grant request for refresh.
#[derive(Debug, Serialize)]
struct RefreshRequest {
    refresh_token: String,
}

/// Credentials grant request for sign-up and sign-in.
#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Token grant response shared by sign-up, sign-in, and refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            user_id: self.user.id,
            email: self.user.email,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

impl SupabaseBackend {
    /// Build the auth API URL for an endpoint path.
    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.api_url, path)
    }

    /// Subscribe to session changes. Dropping the receiver unsubscribes.
    pub fn subscribe_session_changes(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    fn emit(&self, change: SessionChange) {
        let _ = self.changes.send(change);
    }

    /// Create an account with email and password.
    ///
    /// On success the new session is persisted and a `SignedIn` change is
    /// broadcast. The profile row is the identity synchronizer's concern.
    pub async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        let url = self.auth_url("signup");

        debug!(url = %url, email = %email, "Attempting sign-up");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Sign-up failed");
            return Err(BackendError::Request {
                status: status.as_u16(),
                message: format!("sign up: {}", body),
            });
        }

        let session = response.json::<TokenResponse>().await?.into_session();
        self.store.save(&session)?;
        self.emit(SessionChange::SignedIn(session.clone()));

        info!(user_id = %session.user_id, "Sign-up successful");
        Ok(session)
    }

    /// Validate email/password credentials.
    ///
    /// On success the session is persisted and a `SignedIn` change is
    /// broadcast; profile resolution happens downstream of that broadcast.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<Session> {
        let url = self.auth_url("token?grant_type=password");

        debug!(url = %url, email = %email, "Attempting email/password sign-in");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Sign-in failed");
            return Err(BackendError::InvalidCredentials(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let session = response.json::<TokenResponse>().await?.into_session();
        self.store.save(&session)?;
        self.emit(SessionChange::SignedIn(session.clone()));

        info!(user_id = %session.user_id, "Sign-in successful");
        Ok(session)
    }

    /// Terminate the session.
    ///
    /// The stored session is cleared and `SignedOut` broadcast before the
    /// server call, so local state converges even when the server is
    /// unreachable; a server-side failure is still returned to the caller.
    pub async fn sign_out(&self) -> BackendResult<()> {
        let Some(session) = self.store.load()? else {
            debug!("Sign-out with no stored session, nothing to do");
            return Ok(());
        };

        self.store.clear()?;
        self.emit(SessionChange::SignedOut);

        let url = self.auth_url("logout");
        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Server sign-out failed (local session cleared)");
            return Err(BackendError::Request {
                status: status.as_u16(),
                message: format!("sign out: {}", body),
            });
        }

        info!("Signed out");
        Ok(())
    }

    /// Current session, refreshing the access token when it has expired.
    ///
    /// Returns `Ok(None)` when no session is stored, and also when a refresh
    /// fails terminally: in that case the stored session is cleared and
    /// `SignedOut` broadcast, so callers observe a settled signed-out state
    /// rather than an error.
    pub async fn current_session(&self) -> BackendResult<Option<Session>> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };

        if !session.is_expired() {
            return Ok(Some(session));
        }

        info!(user_id = %session.user_id, "Session expired, attempting refresh");
        match self.refresh_with_backoff(&session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.store.clear()?;
                self.emit(SessionChange::SignedOut);
                Ok(None)
            }
        }
    }

    /// Refresh the session with exponential backoff retry.
    ///
    /// Only transient errors are retried; a rejection (revoked refresh token)
    /// fails immediately.
    async fn refresh_with_backoff(&self, refresh_token: &str) -> BackendResult<Session> {
        let mut last_error = None;

        for attempt in 0..self.refresh_config.max_retries {
            match self.try_refresh(refresh_token).await {
                Ok(session) => return Ok(session),
                Err(e) if e.is_transient() => {
                    last_error = Some(e);

                    if attempt + 1 < self.refresh_config.max_retries {
                        let delay = self.refresh_config.delay_for_attempt(attempt);
                        debug!(
                            attempt = attempt + 1,
                            max_retries = self.refresh_config.max_retries,
                            delay_ms = delay.as_millis(),
                            "Refresh failed with transient error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    warn!("Refresh failed with non-transient error: {}", e);
                    return Err(e);
                }
            }
        }

        warn!(
            "Refresh failed after {} attempts",
            self.refresh_config.max_retries
        );
        Err(last_error.unwrap_or(BackendError::RefreshExhausted(self.refresh_config.max_retries)))
    }

    /// Single attempt to refresh the session.
    async fn try_refresh(&self, refresh_token: &str) -> BackendResult<Session> {
        let url = self.auth_url("token?grant_type=refresh_token");

        debug!(url = %url, "Refreshing token");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Token refresh failed");
            return Err(if status.is_server_error() {
                BackendError::Request {
                    status: status.as_u16(),
                    message: format!("token refresh: {}", body),
                }
            } else {
                BackendError::TokenRefresh(format!("HTTP {}: {}", status, body))
            });
        }

        let session = response.json::<TokenResponse>().await?.into_session();
        self.store.save(&session)?;
        self.emit(SessionChange::TokenRefreshed(session.clone()));

        info!(user_id = %session.user_id, "Token refreshed successfully");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::StoreResult;
    use std::sync::Mutex;

    struct MemorySessionStore {
        session: Mutex<Option<Session>>,
    }

    impl MemorySessionStore {
        fn new() -> Self {
            Self {
                session: Mutex::new(None),
            }
        }
    }

    impl SessionStore for MemorySessionStore {
        fn save(&self, session: &Session) -> StoreResult<()> {
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        fn load(&self) -> StoreResult<Option<Session>> {
            Ok(self.session.lock().unwrap().clone())
        }

        fn clear(&self) -> StoreResult<bool> {
            Ok(self.session.lock().unwrap().take().is_some())
        }
    }

    fn test_backend() -> SupabaseBackend {
        SupabaseBackend::new(
            "https://test.supabase.co",
            "test-key",
            Box::new(MemorySessionStore::new()),
        )
    }

    fn stored_session(expires_in_secs: i64) -> Session {
        Session {
            user_id: "user-123".to_string(),
            email: Some("test@example.com".to_string()),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    #[test]
    fn test_auth_url() {
        let backend = test_backend();
        assert_eq!(
            backend.auth_url("signup"),
            "https://test.supabase.co/auth/v1/signup"
        );
        assert_eq!(
            backend.auth_url("token?grant_type=password"),
            "https://test.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[tokio::test]
    async fn test_current_session_none_when_store_empty() {
        let backend = test_backend();
        assert!(backend.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_session_returns_valid_session_without_network() {
        let backend = test_backend();
        let session = stored_session(3600);
        backend.store.save(&session).unwrap();

        let current = backend.current_session().await.unwrap().unwrap();
        assert_eq!(current, session);
    }

    #[tokio::test]
    async fn test_sign_out_without_session_is_a_no_op() {
        let backend = test_backend();
        let mut rx = backend.subscribe_session_changes();

        backend.sign_out().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_token_response_into_session() {
        let data = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 3600,
            user: TokenUser {
                id: "user-1".to_string(),
                email: Some("u@example.com".to_string()),
            },
        };

        let session = data.into_session();
        assert_eq!(session.user_id, "user-1");
        assert!(!session.is_expired());
    }

    #[test]
    fn test_refresh_config_default() {
        let config = RefreshConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_ms, 500);
        assert_eq!(config.max_delay_ms, 5000);
    }

    #[test]
    fn test_refresh_config_delay_exponential_backoff() {
        let config = RefreshConfig::default();

        assert_eq!(
            config.delay_for_attempt(0),
            std::time::Duration::from_millis(500)
        );
        assert_eq!(
            config.delay_for_attempt(1),
            std::time::Duration::from_millis(1000)
        );
        assert_eq!(
            config.delay_for_attempt(2),
            std::time::Duration::from_millis(2000)
        );
        // Capped at max_delay_ms from attempt 4 onward.
        assert_eq!(
            config.delay_for_attempt(4),
            std::time::Duration::from_millis(5000)
        );
        assert_eq!(
            config.delay_for_attempt(10),
            std::time::Duration::from_millis(5000)
        );
    }
}
