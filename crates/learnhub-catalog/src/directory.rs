//! The course directory store.

use learnhub_backend::{BackendResult, Course, CourseUpdate, MarketplaceApi, NewCourse};
use learnhub_core::{CollectionMachine, CollectionMachineInput, CollectionPhase, Notifier};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

struct DirectoryState {
    courses: Vec<Course>,
    machine: CollectionMachine,
}

/// Cache of all courses, replaced wholesale by every fetch.
///
/// Mutations go to the backend first and re-enter fetching on success; there
/// is no optimistic local mutation and nothing to roll back.
pub struct CourseDirectory<B: MarketplaceApi> {
    backend: Arc<B>,
    notifier: Notifier,
    state: Mutex<DirectoryState>,
}

impl<B: MarketplaceApi> CourseDirectory<B> {
    /// Create a new directory with an empty cache.
    pub fn new(backend: Arc<B>, notifier: Notifier) -> Self {
        Self {
            backend,
            notifier,
            state: Mutex::new(DirectoryState {
                courses: Vec::new(),
                machine: CollectionMachine::new(),
            }),
        }
    }

    /// Current lifecycle phase of the cache.
    pub fn phase(&self) -> CollectionPhase {
        let state = self.state.lock().unwrap();
        CollectionPhase::from(state.machine.state())
    }

    /// Snapshot of the cached course list.
    pub fn courses(&self) -> Vec<Course> {
        self.state.lock().unwrap().courses.clone()
    }

    fn transition(&self, input: &CollectionMachineInput) {
        let mut state = self.state.lock().unwrap();
        if state.machine.consume(input).is_err() {
            debug!(?input, "Tolerated directory phase transition");
        }
    }

    /// Replace the local cache wholesale with the backend's course list.
    ///
    /// A failed refresh notifies and degrades to the stale cache; it is never
    /// re-thrown.
    pub async fn fetch_courses(&self) {
        self.transition(&CollectionMachineInput::FetchStarted);

        match self.backend.fetch_courses().await {
            Ok(courses) => {
                let mut state = self.state.lock().unwrap();
                state.courses = courses;
                let _ = state
                    .machine
                    .consume(&CollectionMachineInput::FetchSucceeded);
                debug!(count = state.courses.len(), "Course cache refreshed");
            }
            Err(e) => {
                warn!(error = %e, "Error loading courses");
                self.transition(&CollectionMachineInput::FetchFailed);
                self.notifier.error("Error loading courses", e.to_string());
            }
        }
    }

    /// Create a course, report the outcome, and refresh the cache on success.
    pub async fn create_course(&self, course: NewCourse) -> BackendResult<Course> {
        self.transition(&CollectionMachineInput::MutationStarted);
        let title = course.title.clone();

        match self.backend.insert_course(course).await {
            Ok(created) => {
                self.transition(&CollectionMachineInput::MutationSucceeded);
                self.notifier.success(
                    "Course created successfully",
                    format!("{} has been added to your courses.", title),
                );
                self.fetch_courses().await;
                Ok(created)
            }
            Err(e) => {
                self.transition(&CollectionMachineInput::MutationFailed);
                self.notifier.error("Error creating course", e.to_string());
                Err(e)
            }
        }
    }

    /// Apply a partial update, report the outcome, and refresh on success.
    pub async fn update_course(&self, course_id: &str, patch: CourseUpdate) -> BackendResult<()> {
        self.transition(&CollectionMachineInput::MutationStarted);

        match self.backend.update_course(course_id, patch).await {
            Ok(()) => {
                self.transition(&CollectionMachineInput::MutationSucceeded);
                self.notifier.success(
                    "Course updated successfully",
                    "Your changes have been saved.",
                );
                self.fetch_courses().await;
                Ok(())
            }
            Err(e) => {
                self.transition(&CollectionMachineInput::MutationFailed);
                self.notifier.error("Error updating course", e.to_string());
                Err(e)
            }
        }
    }

    /// Delete a course, report the outcome, and refresh on success.
    pub async fn delete_course(&self, course_id: &str) -> BackendResult<()> {
        self.transition(&CollectionMachineInput::MutationStarted);

        match self.backend.delete_course(course_id).await {
            Ok(()) => {
                self.transition(&CollectionMachineInput::MutationSucceeded);
                self.notifier.success(
                    "Course deleted successfully",
                    "The course has been removed from the catalog.",
                );
                self.fetch_courses().await;
                Ok(())
            }
            Err(e) => {
                self.transition(&CollectionMachineInput::MutationFailed);
                self.notifier.error("Error deleting course", e.to_string());
                Err(e)
            }
        }
    }
}
