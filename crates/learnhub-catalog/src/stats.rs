//! Instructor dashboard aggregation.

use learnhub_backend::Course;

/// Aggregated figures for an instructor's own courses.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructorStats {
    /// Number of courses owned by the instructor.
    pub courses: usize,
    /// Total students across those courses.
    pub total_students: i64,
    /// Total revenue: sum of `price × students` per course.
    pub total_revenue: f64,
}

/// Compute dashboard figures over the courses owned by `instructor_id`.
///
/// `students` counts come from backend-side aggregation; this only folds the
/// cached rows.
pub fn instructor_stats(courses: &[Course], instructor_id: &str) -> InstructorStats {
    let own = courses.iter().filter(|c| c.instructor_id == instructor_id);

    let mut stats = InstructorStats {
        courses: 0,
        total_students: 0,
        total_revenue: 0.0,
    };

    for course in own {
        stats.courses += 1;
        stats.total_students += course.students;
        stats.total_revenue += course.price * course.students as f64;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use learnhub_backend::CourseLevel;

    fn course(instructor_id: &str, price: f64, students: i64) -> Course {
        Course {
            id: uuid::Uuid::new_v4().to_string(),
            title: "Course".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            instructor_id: instructor_id.to_string(),
            instructor: None,
            price,
            level: CourseLevel::Intermediate,
            category: "Programming".to_string(),
            rating: 4.5,
            students,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_course_earns_no_revenue() {
        let courses = vec![course("instructor-1", 89.0, 0)];
        let stats = instructor_stats(&courses, "instructor-1");
        assert_eq!(stats.courses, 1);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_revenue, 0.0);
    }

    #[test]
    fn test_revenue_recomputes_from_student_count() {
        // Three enrollments push `students` to 3: revenue is 89 × 3 = 267.
        let courses = vec![course("instructor-1", 89.0, 3)];
        let stats = instructor_stats(&courses, "instructor-1");
        assert_eq!(stats.total_revenue, 267.0);
    }

    #[test]
    fn test_only_own_courses_count() {
        let courses = vec![
            course("instructor-1", 89.0, 3),
            course("instructor-2", 50.0, 10),
        ];
        let stats = instructor_stats(&courses, "instructor-1");
        assert_eq!(stats.courses, 1);
        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.total_revenue, 267.0);
    }

    #[test]
    fn test_multiple_courses_sum() {
        let courses = vec![
            course("instructor-1", 89.0, 3),
            course("instructor-1", 20.0, 5),
        ];
        let stats = instructor_stats(&courses, "instructor-1");
        assert_eq!(stats.courses, 2);
        assert_eq!(stats.total_students, 8);
        assert_eq!(stats.total_revenue, 367.0);
    }

    #[test]
    fn test_empty_catalog() {
        let stats = instructor_stats(&[], "instructor-1");
        assert_eq!(stats, InstructorStats { courses: 0, total_students: 0, total_revenue: 0.0 });
    }
}
