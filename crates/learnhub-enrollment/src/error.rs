//! Enrollment error types.

use learnhub_backend::BackendError;
use thiserror::Error;

/// Enrollment ledger error type.
#[derive(Error, Debug)]
pub enum EnrollmentError {
    /// Progress outside the [0, 100] range was rejected before any backend
    /// call.
    #[error("Progress must be between 0 and 100, got {0}")]
    InvalidProgress(i32),

    /// Backend request error
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type alias using EnrollmentError.
pub type EnrollmentResult<T> = Result<T, EnrollmentError>;
