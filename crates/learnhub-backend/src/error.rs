//! Backend error types.

use thiserror::Error;

/// Errors from the session store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// IO error reading or writing the persisted session
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt or unreadable session payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Backend request error type.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Invalid email or password
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The backend rejected a request
    #[error("Backend request failed (HTTP {status}): {message}")]
    Request { status: u16, message: String },

    /// Token refresh error
    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    /// Refresh retries exhausted
    #[error("Token refresh failed after {0} attempts")]
    RefreshExhausted(u32),

    /// A write that should return the affected row returned nothing
    #[error("Backend returned no rows for {0}")]
    MissingRecord(&'static str),

    /// Session store error
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Returns true if this error is transient and the operation can be retried.
    ///
    /// Transient errors include connection failures, timeouts, and HTTP 5xx
    /// responses.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            BackendError::Request { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

/// Result type alias using BackendError.
pub type BackendResult<T> = Result<T, BackendError>;
