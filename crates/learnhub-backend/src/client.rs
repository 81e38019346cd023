//! HTTP client for the record collections (`users`, `courses`, `enrollments`).
//!
//! Speaks PostgREST: filters as query parameters (`id=eq.…`), embedded joins
//! through `select=`, and `Prefer` headers controlling write behavior. Row
//! authorization (instructor-only course mutation) and the unique index on
//! `(user_id, course_id)` are enforced server-side; this client does not
//! re-validate them.

use crate::auth::RefreshConfig;
use crate::error::{BackendError, BackendResult};
use crate::session::{SessionChange, SessionStore};
use crate::types::{
    Course, CourseUpdate, EnrolledCourse, Enrollment, NewCourse, NewProfile, UserProfile,
};
use serde::Serialize;
use tokio::sync::broadcast;

/// Buffer size for the session-change broadcast channel.
const SESSION_CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Insert payload for a new enrollment. `enrolled_at` is server-assigned.
#[derive(Debug, Serialize)]
struct NewEnrollment<'a> {
    user_id: &'a str,
    course_id: &'a str,
    progress: i32,
}

/// Production backend client.
///
/// One instance is shared by every store; cloning is not needed because the
/// stores hold it behind an `Arc`.
pub struct SupabaseBackend {
    pub(crate) http_client: reqwest::Client,
    pub(crate) api_url: String,
    pub(crate) publishable_key: String,
    pub(crate) store: Box<dyn SessionStore>,
    pub(crate) changes: broadcast::Sender<SessionChange>,
    pub(crate) refresh_config: RefreshConfig,
}

impl SupabaseBackend {
    /// Create a new backend client.
    ///
    /// # Arguments
    /// * `api_url` - The project API URL (e.g., `https://xyz.supabase.co`)
    /// * `publishable_key` - The publishable (anonymous) API key
    /// * `store` - Session persistence backend
    pub fn new(
        api_url: impl Into<String>,
        publishable_key: impl Into<String>,
        store: Box<dyn SessionStore>,
    ) -> Self {
        let (changes, _) = broadcast::channel(SESSION_CHANGE_CHANNEL_CAPACITY);
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            publishable_key: publishable_key.into(),
            store,
            changes,
            refresh_config: RefreshConfig::default(),
        }
    }

    /// Override the token refresh retry configuration.
    pub fn with_refresh_config(mut self, refresh_config: RefreshConfig) -> Self {
        self.refresh_config = refresh_config;
        self
    }

    /// Build the REST API URL for a table.
    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    /// Bearer token for record requests: the session's access token when
    /// signed in (refreshed if needed), the publishable key otherwise.
    async fn bearer_token(&self) -> BackendResult<String> {
        match self.current_session().await? {
            Some(session) => Ok(session.access_token),
            None => Ok(self.publishable_key.clone()),
        }
    }

    /// Map a non-success response to an error, logging the body.
    pub(crate) async fn request_error(
        context: &'static str,
        response: reqwest::Response,
    ) -> BackendError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, context, "backend request failed");
        BackendError::Request {
            status: status.as_u16(),
            message: format!("{}: {}", context, body),
        }
    }

    // ==========================================
    // users
    // ==========================================

    /// Fetch the profile matching an auth user id.
    ///
    /// Returns `Ok(None)` when no profile row exists for that id.
    pub async fn fetch_profile(&self, user_id: &str) -> BackendResult<Option<UserProfile>> {
        let url = format!(
            "{}?id=eq.{}&select=*&limit=1",
            self.rest_url("users"),
            user_id
        );
        let token = self.bearer_token().await?;

        tracing::debug!(user_id = %user_id, "Fetching user profile");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("fetch profile", response).await);
        }

        let profiles: Vec<UserProfile> = response.json().await?;
        Ok(profiles.into_iter().next())
    }

    /// Insert a profile row for a freshly created account.
    pub async fn insert_profile(&self, profile: NewProfile) -> BackendResult<UserProfile> {
        let url = self.rest_url("users");
        let token = self.bearer_token().await?;

        tracing::debug!(user_id = %profile.id, "Inserting user profile");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&profile)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("insert profile", response).await);
        }

        let inserted: Vec<UserProfile> = response.json().await?;
        inserted
            .into_iter()
            .next()
            .ok_or(BackendError::MissingRecord("profile insert"))
    }

    // ==========================================
    // courses
    // ==========================================

    /// Fetch all courses joined with their instructor, newest first.
    pub async fn fetch_courses(&self) -> BackendResult<Vec<Course>> {
        let url = format!(
            "{}?select=*,instructor:users(*)&order=created_at.desc",
            self.rest_url("courses")
        );
        let token = self.bearer_token().await?;

        tracing::debug!("Fetching courses");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("fetch courses", response).await);
        }

        let courses: Vec<Course> = response.json().await?;
        tracing::debug!("Fetched {} courses", courses.len());
        Ok(courses)
    }

    /// Insert a new course and return it with server-assigned fields.
    pub async fn insert_course(&self, course: NewCourse) -> BackendResult<Course> {
        let url = format!(
            "{}?select=*,instructor:users(*)",
            self.rest_url("courses")
        );
        let token = self.bearer_token().await?;

        tracing::debug!(title = %course.title, "Inserting course");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&course)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("insert course", response).await);
        }

        let inserted: Vec<Course> = response.json().await?;
        inserted
            .into_iter()
            .next()
            .ok_or(BackendError::MissingRecord("course insert"))
    }

    /// Apply a partial update to a course by id.
    pub async fn update_course(&self, course_id: &str, patch: CourseUpdate) -> BackendResult<()> {
        let url = format!("{}?id=eq.{}", self.rest_url("courses"), course_id);
        let token = self.bearer_token().await?;

        tracing::debug!(course_id = %course_id, "Updating course");

        let response = self
            .http_client
            .patch(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("update course", response).await);
        }

        Ok(())
    }

    /// Delete a course by id.
    pub async fn delete_course(&self, course_id: &str) -> BackendResult<()> {
        let url = format!("{}?id=eq.{}", self.rest_url("courses"), course_id);
        let token = self.bearer_token().await?;

        tracing::debug!(course_id = %course_id, "Deleting course");

        let response = self
            .http_client
            .delete(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("delete course", response).await);
        }

        Ok(())
    }

    // ==========================================
    // enrollments
    // ==========================================

    /// Fetch a user's enrollments joined with their courses, newest first.
    pub async fn fetch_enrollments(&self, user_id: &str) -> BackendResult<Vec<EnrolledCourse>> {
        let url = format!(
            "{}?select=*,course:courses(*)&user_id=eq.{}&order=enrolled_at.desc",
            self.rest_url("enrollments"),
            user_id
        );
        let token = self.bearer_token().await?;

        tracing::debug!(user_id = %user_id, "Fetching enrollments");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("fetch enrollments", response).await);
        }

        let enrollments: Vec<EnrolledCourse> = response.json().await?;
        tracing::debug!("Fetched {} enrollments", enrollments.len());
        Ok(enrollments)
    }

    /// Look up a single enrollment by `(user_id, course_id)`.
    ///
    /// Returns `Ok(None)` when the user is not enrolled in that course.
    pub async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> BackendResult<Option<Enrollment>> {
        let url = format!(
            "{}?user_id=eq.{}&course_id=eq.{}&select=id,user_id,course_id,enrolled_at,progress&limit=1",
            self.rest_url("enrollments"),
            user_id,
            course_id
        );
        let token = self.bearer_token().await?;

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("find enrollment", response).await);
        }

        let enrollments: Vec<Enrollment> = response.json().await?;
        Ok(enrollments.into_iter().next())
    }

    /// Insert an enrollment with `progress = 0`.
    ///
    /// The insert is conflict-safe: a concurrent duplicate is ignored via
    /// `on_conflict` rather than surfacing a constraint violation, and the
    /// existing row is returned instead. The uniqueness of
    /// `(user_id, course_id)` itself is the backend's unique index.
    pub async fn insert_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> BackendResult<Enrollment> {
        let url = format!(
            "{}?on_conflict=user_id,course_id",
            self.rest_url("enrollments")
        );
        let token = self.bearer_token().await?;

        tracing::debug!(user_id = %user_id, course_id = %course_id, "Inserting enrollment");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(&NewEnrollment {
                user_id,
                course_id,
                progress: 0,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("insert enrollment", response).await);
        }

        let inserted: Vec<Enrollment> = response.json().await?;
        if let Some(enrollment) = inserted.into_iter().next() {
            return Ok(enrollment);
        }

        // Duplicate ignored by on_conflict: another client won the race.
        tracing::debug!(
            user_id = %user_id,
            course_id = %course_id,
            "Enrollment insert ignored as duplicate, fetching existing row"
        );
        self.find_enrollment(user_id, course_id)
            .await?
            .ok_or(BackendError::MissingRecord("enrollment insert"))
    }

    /// Update the progress of an enrollment by id.
    pub async fn update_enrollment_progress(
        &self,
        enrollment_id: &str,
        progress: i32,
    ) -> BackendResult<()> {
        let url = format!("{}?id=eq.{}", self.rest_url("enrollments"), enrollment_id);
        let token = self.bearer_token().await?;

        tracing::debug!(enrollment_id = %enrollment_id, progress, "Updating enrollment progress");

        let response = self
            .http_client
            .patch(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "progress": progress }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::request_error("update enrollment progress", response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::StoreResult;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    pub(crate) struct MemorySessionStore {
        session: Mutex<Option<Session>>,
    }

    impl MemorySessionStore {
        pub(crate) fn new() -> Self {
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

    #[test]
    fn test_client_creation() {
        let backend = test_backend();
        assert_eq!(backend.api_url, "https://test.supabase.co");
        assert_eq!(backend.publishable_key, "test-key");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let backend = SupabaseBackend::new(
            "https://test.supabase.co/",
            "test-key",
            Box::new(MemorySessionStore::new()),
        );
        assert_eq!(backend.api_url, "https://test.supabase.co");
    }

    #[test]
    fn test_rest_url() {
        let backend = test_backend();
        assert_eq!(
            backend.rest_url("courses"),
            "https://test.supabase.co/rest/v1/courses"
        );
    }

    #[tokio::test]
    async fn test_bearer_token_falls_back_to_publishable_key() {
        let backend = test_backend();
        assert_eq!(backend.bearer_token().await.unwrap(), "test-key");
    }

    #[tokio::test]
    async fn test_bearer_token_uses_session_token_when_valid() {
        let backend = test_backend();
        backend
            .store
            .save(&Session {
                user_id: "user-1".to_string(),
                email: None,
                access_token: "session-token".to_string(),
                refresh_token: "refresh".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            })
            .unwrap();

        assert_eq!(backend.bearer_token().await.unwrap(), "session-token");
    }

    #[test]
    fn test_new_enrollment_serialization() {
        let body = NewEnrollment {
            user_id: "user-1",
            course_id: "course-1",
            progress: 0,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            "{\"user_id\":\"user-1\",\"course_id\":\"course-1\",\"progress\":0}"
        );
    }
}
