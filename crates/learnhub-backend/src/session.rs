//! Auth session representation and persistence.
//!
//! The session survives process restarts through the `SessionStore` trait.
//! Production uses `FileSessionStore` (plain JSON under `~/.learnhub`); tests
//! substitute an in-memory store.

use crate::{StoreError, StoreResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How long before the recorded expiry a session already counts as expired,
/// so tokens are refreshed before the server starts rejecting them.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// An authenticated session issued by the remote auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// User ID from the auth service.
    pub user_id: String,
    /// User email, when the auth service reports one.
    #[serde(default)]
    pub email: Option<String>,
    /// JWT access token for API authentication.
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    pub refresh_token: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns true once the access token is (almost) past its validity window.
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_LEEWAY_SECS) >= self.expires_at
    }
}

/// A change in the authenticated session, broadcast to subscribers.
#[derive(Debug, Clone)]
pub enum SessionChange {
    /// A sign-up or sign-in produced a session.
    SignedIn(Session),
    /// An expired access token was replaced.
    TokenRefreshed(Session),
    /// The session ended (sign-out or failed refresh).
    SignedOut,
}

/// Trait for session persistence backends.
pub trait SessionStore: Send + Sync {
    /// Persist the session, replacing any previous one.
    fn save(&self, session: &Session) -> StoreResult<()>;

    /// Load the persisted session, if any.
    fn load(&self) -> StoreResult<Option<Session>>;

    /// Remove the persisted session. Returns true if one existed.
    fn clear(&self) -> StoreResult<bool>;
}

/// File-backed session store writing JSON to a fixed path.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store persisting to the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn load(&self) -> StoreResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content).map_err(StoreError::from)?;
        Ok(Some(session))
    }

    fn clear(&self) -> StoreResult<bool> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            return Ok(true);
        }
        Ok(false)
    }
}
