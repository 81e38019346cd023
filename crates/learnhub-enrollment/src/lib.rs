//! Enrollment ledger for LearnHub.
//!
//! Owns the signed-in user's enrollment set:
//! - Full-refresh caching of enrollments joined with their courses
//! - Idempotent enroll with an authenticated-user precondition
//! - Range-validated progress updates
//! - Student dashboard aggregation

mod error;
mod ledger;
mod stats;

pub use error::{EnrollmentError, EnrollmentResult};
pub use ledger::{CurrentUserSource, EnrollmentLedger};
pub use stats::{student_stats, StudentStats};
