//! Course directory for LearnHub.
//!
//! Caches the course list and passes CRUD through to the backend, refreshing
//! the whole cache after every mutation. Also provides the pure catalog
//! filters and the instructor dashboard aggregation.

mod directory;
mod filter;
mod stats;

pub use directory::CourseDirectory;
pub use filter::{categories, filter_courses};
pub use stats::{instructor_stats, InstructorStats};
