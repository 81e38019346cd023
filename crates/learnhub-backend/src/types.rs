//! Record types for the `users`, `courses`, and `enrollments` collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Instructor,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Instructor => write!(f, "instructor"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "instructor" => Ok(UserRole::Instructor),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseLevel::Beginner => write!(f, "Beginner"),
            CourseLevel::Intermediate => write!(f, "Intermediate"),
            CourseLevel::Advanced => write!(f, "Advanced"),
        }
    }
}

impl std::str::FromStr for CourseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            other => Err(format!("Unknown level: {}", other)),
        }
    }
}

/// A user profile row, keyed by the auth session's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new user profile.
///
/// The id mirrors the freshly created session's user id; timestamps are
/// server-assigned.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// A course row, optionally joined with its instructor's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub instructor_id: String,
    /// Joined instructor profile (present when fetched with the join).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<UserProfile>,
    pub price: f64,
    pub level: CourseLevel,
    pub category: String,
    pub rating: f64,
    pub students: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new course.
#[derive(Debug, Clone, Serialize)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub instructor_id: String,
    pub price: f64,
    pub level: CourseLevel,
    pub category: String,
    pub rating: f64,
    pub students: i64,
}

/// Partial update for a course. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<CourseLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// An enrollment row linking a user to a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
    /// Completion percentage in [0, 100].
    pub progress: i32,
}

/// An enrollment joined with its course, as returned by the enrollment fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
    pub progress: i32,
    pub course: Course,
}

impl EnrolledCourse {
    /// Returns true once the course has been fully completed.
    pub fn is_completed(&self) -> bool {
        self.progress == 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> UserProfile {
        UserProfile {
            id: "user-123".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Instructor,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_serialization_is_snake_case() {
        let json = serde_json::to_string(&UserRole::Instructor).unwrap();
        assert_eq!(json, "\"instructor\"");

        let role: UserRole = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, UserRole::Student);
    }

    #[test]
    fn test_level_serialization_keeps_capitalization() {
        let json = serde_json::to_string(&CourseLevel::Beginner).unwrap();
        assert_eq!(json, "\"Beginner\"");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("instructor".parse::<UserRole>().unwrap(), UserRole::Instructor);
        assert_eq!("Student".parse::<UserRole>().unwrap(), UserRole::Student);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!(
            "advanced".parse::<CourseLevel>().unwrap(),
            CourseLevel::Advanced
        );
        assert!("expert".parse::<CourseLevel>().is_err());
    }

    #[test]
    fn test_course_update_skips_unset_fields() {
        let patch = CourseUpdate {
            price: Some(49.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, "{\"price\":49.0}");
    }

    #[test]
    fn test_course_deserializes_without_join() {
        let json = r#"{
            "id": "c1",
            "title": "Rust Basics",
            "description": "Start here",
            "thumbnail": "https://example.com/t.png",
            "instructor_id": "user-123",
            "price": 89.0,
            "level": "Beginner",
            "category": "Programming",
            "rating": 4.5,
            "students": 0,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;

        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.title, "Rust Basics");
        assert!(course.instructor.is_none());
    }

    #[test]
    fn test_enrolled_course_deserializes_with_join() {
        let profile = sample_profile();
        let json = format!(
            r#"{{
                "id": "e1",
                "user_id": "{}",
                "course_id": "c1",
                "enrolled_at": "2024-02-01T00:00:00Z",
                "progress": 100,
                "course": {{
                    "id": "c1",
                    "title": "Rust Basics",
                    "description": "Start here",
                    "thumbnail": "",
                    "instructor_id": "user-123",
                    "price": 89.0,
                    "level": "Beginner",
                    "category": "Programming",
                    "rating": 4.5,
                    "students": 3,
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z"
                }}
            }}"#,
            profile.id
        );

        let enrolled: EnrolledCourse = serde_json::from_str(&json).unwrap();
        assert!(enrolled.is_completed());
        assert_eq!(enrolled.course.students, 3);
    }

    #[test]
    fn test_new_profile_serializes_all_fields() {
        let new = NewProfile {
            id: "user-1".to_string(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            role: UserRole::Student,
        };
        let json = serde_json::to_string(&new).unwrap();
        assert!(json.contains("\"id\":\"user-1\""));
        assert!(json.contains("\"role\":\"student\""));
    }
}
