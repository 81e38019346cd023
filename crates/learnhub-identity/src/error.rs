//! Identity error types.

use learnhub_backend::BackendError;
use thiserror::Error;

/// Identity synchronization error type.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Backend request error
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Invalid state transition in the identity FSM
    #[error("Invalid identity state transition: {0}")]
    InvalidTransition(String),
}

/// Result type alias using IdentityError.
pub type IdentityResult<T> = Result<T, IdentityError>;
