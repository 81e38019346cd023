//! The backend contract consumed by the stores.
//!
//! The stores (identity synchronizer, course directory, enrollment ledger)
//! are generic over this trait; production wires in `SupabaseBackend`, tests
//! wire in in-memory fakes.

use crate::client::SupabaseBackend;
use crate::error::BackendResult;
use crate::session::{Session, SessionChange};
use crate::types::{
    Course, CourseUpdate, EnrolledCourse, Enrollment, NewCourse, NewProfile, UserProfile,
};
use tokio::sync::broadcast;

/// Full contract of the remote backend: session lifecycle plus record CRUD
/// against the `users`, `courses`, and `enrollments` collections.
#[allow(async_fn_in_trait)]
pub trait MarketplaceApi: Send + Sync {
    // ==========================================
    // Session lifecycle
    // ==========================================

    /// Current session, if any; implementations refresh expired tokens.
    async fn current_session(&self) -> BackendResult<Option<Session>>;

    /// Create an account; on success a `SignedIn` change is broadcast.
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Validate credentials; on success a `SignedIn` change is broadcast.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> BackendResult<Session>;

    /// Terminate the session; a `SignedOut` change is broadcast.
    async fn sign_out(&self) -> BackendResult<()>;

    /// Subscribe to session changes. Dropping the receiver unsubscribes.
    fn subscribe_session_changes(&self) -> broadcast::Receiver<SessionChange>;

    // ==========================================
    // users
    // ==========================================

    async fn fetch_profile(&self, user_id: &str) -> BackendResult<Option<UserProfile>>;

    async fn insert_profile(&self, profile: NewProfile) -> BackendResult<UserProfile>;

    // ==========================================
    // courses
    // ==========================================

    /// All courses joined with their instructor, newest first.
    async fn fetch_courses(&self) -> BackendResult<Vec<Course>>;

    async fn insert_course(&self, course: NewCourse) -> BackendResult<Course>;

    async fn update_course(&self, course_id: &str, patch: CourseUpdate) -> BackendResult<()>;

    async fn delete_course(&self, course_id: &str) -> BackendResult<()>;

    // ==========================================
    // enrollments
    // ==========================================

    /// A user's enrollments joined with their courses, newest first.
    async fn fetch_enrollments(&self, user_id: &str) -> BackendResult<Vec<EnrolledCourse>>;

    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> BackendResult<Option<Enrollment>>;

    /// Conflict-safe insert with `progress = 0`; duplicates resolve to the
    /// existing row instead of violating the uniqueness invariant.
    async fn insert_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> BackendResult<Enrollment>;

    async fn update_enrollment_progress(
        &self,
        enrollment_id: &str,
        progress: i32,
    ) -> BackendResult<()>;
}

impl MarketplaceApi for SupabaseBackend {
    async fn current_session(&self) -> BackendResult<Option<Session>> {
        SupabaseBackend::current_session(self).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        SupabaseBackend::sign_up(self, email, password).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<Session> {
        SupabaseBackend::sign_in_with_password(self, email, password).await
    }

    async fn sign_out(&self) -> BackendResult<()> {
        SupabaseBackend::sign_out(self).await
    }

    fn subscribe_session_changes(&self) -> broadcast::Receiver<SessionChange> {
        SupabaseBackend::subscribe_session_changes(self)
    }

    async fn fetch_profile(&self, user_id: &str) -> BackendResult<Option<UserProfile>> {
        SupabaseBackend::fetch_profile(self, user_id).await
    }

    async fn insert_profile(&self, profile: NewProfile) -> BackendResult<UserProfile> {
        SupabaseBackend::insert_profile(self, profile).await
    }

    async fn fetch_courses(&self) -> BackendResult<Vec<Course>> {
        SupabaseBackend::fetch_courses(self).await
    }

    async fn insert_course(&self, course: NewCourse) -> BackendResult<Course> {
        SupabaseBackend::insert_course(self, course).await
    }

    async fn update_course(&self, course_id: &str, patch: CourseUpdate) -> BackendResult<()> {
        SupabaseBackend::update_course(self, course_id, patch).await
    }

    async fn delete_course(&self, course_id: &str) -> BackendResult<()> {
        SupabaseBackend::delete_course(self, course_id).await
    }

    async fn fetch_enrollments(&self, user_id: &str) -> BackendResult<Vec<EnrolledCourse>> {
        SupabaseBackend::fetch_enrollments(self, user_id).await
    }

    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> BackendResult<Option<Enrollment>> {
        SupabaseBackend::find_enrollment(self, user_id, course_id).await
    }

    async fn insert_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> BackendResult<Enrollment> {
        SupabaseBackend::insert_enrollment(self, user_id, course_id).await
    }

    async fn update_enrollment_progress(
        &self,
        enrollment_id: &str,
        progress: i32,
    ) -> BackendResult<()> {
        SupabaseBackend::update_enrollment_progress(self, enrollment_id, progress).await
    }
}
