//! Student dashboard aggregation.

use learnhub_backend::EnrolledCourse;

/// Aggregated figures for a student's enrollments.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentStats {
    /// Number of enrolled courses.
    pub enrolled: usize,
    /// Number of completed courses (`progress == 100`).
    pub completed: usize,
    /// Average progress across all enrollments, 0 when there are none.
    pub average_progress: f64,
}

/// Compute dashboard figures over the cached enrollment set.
pub fn student_stats(enrollments: &[EnrolledCourse]) -> StudentStats {
    let enrolled = enrollments.len();
    let completed = enrollments.iter().filter(|e| e.is_completed()).count();
    let average_progress = if enrolled == 0 {
        0.0
    } else {
        enrollments.iter().map(|e| e.progress as f64).sum::<f64>() / enrolled as f64
    };

    StudentStats {
        enrolled,
        completed,
        average_progress,
    }
}
