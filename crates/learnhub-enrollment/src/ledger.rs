//! The enrollment ledger store.

use crate::error::{EnrollmentError, EnrollmentResult};
use learnhub_backend::{EnrolledCourse, MarketplaceApi, UserProfile};
use learnhub_core::{CollectionMachine, CollectionMachineInput, CollectionPhase, Notifier};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Read-only view of the signed-in user, provided by the identity layer.
///
/// The ledger never mutates identity; it only asks who is signed in right
/// now. Implementors return a snapshot, not a live reference.
pub trait CurrentUserSource: Send + Sync {
    /// The signed-in user's profile, if any.
    fn current_profile(&self) -> Option<UserProfile>;
}

struct LedgerState {
    entries: Vec<EnrolledCourse>,
    machine: CollectionMachine,
}

/// The signed-in user's enrollment set, joined with courses.
///
/// Scoped to the current user: the set empties when nobody is signed in.
/// Every mutation refreshes the whole set; `is_enrolled` reads the cache and
/// can be stale for up to one refresh cycle.
pub struct EnrollmentLedger<B: MarketplaceApi> {
    backend: Arc<B>,
    identity: Arc<dyn CurrentUserSource>,
    notifier: Notifier,
    state: Mutex<LedgerState>,
}

impl<B: MarketplaceApi> EnrollmentLedger<B> {
    /// Create a new ledger with an empty set.
    pub fn new(backend: Arc<B>, identity: Arc<dyn CurrentUserSource>, notifier: Notifier) -> Self {
        Self {
            backend,
            identity,
            notifier,
            state: Mutex::new(LedgerState {
                entries: Vec::new(),
                machine: CollectionMachine::new(),
            }),
        }
    }

    /// Current lifecycle phase of the set.
    pub fn phase(&self) -> CollectionPhase {
        let state = self.state.lock().unwrap();
        CollectionPhase::from(state.machine.state())
    }

    /// Snapshot of the cached enrollment set, newest first.
    pub fn enrollments(&self) -> Vec<EnrolledCourse> {
        self.state.lock().unwrap().entries.clone()
    }

    /// True iff the local set contains an enrollment for the course.
    ///
    /// A cache read, not a backend round-trip; stale by at most one refresh
    /// cycle relative to true backend state.
    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .any(|e| e.course_id == course_id)
    }

    fn transition(&self, input: &CollectionMachineInput) {
        let mut state = self.state.lock().unwrap();
        if state.machine.consume(input).is_err() {
            debug!(?input, "Tolerated ledger phase transition");
        }
    }

    /// Replace the local set wholesale with the backend's enrollments for the
    /// signed-in user. Without a signed-in user the set is cleared and no
    /// backend call is made.
    ///
    /// A failed refresh notifies and degrades to the stale set; it is never
    /// re-thrown.
    pub async fn fetch_enrollments(&self) {
        let Some(user) = self.identity.current_profile() else {
            let mut state = self.state.lock().unwrap();
            state.entries.clear();
            return;
        };

        self.transition(&CollectionMachineInput::FetchStarted);

        match self.backend.fetch_enrollments(&user.id).await {
            Ok(entries) => {
                let mut state = self.state.lock().unwrap();
                state.entries = entries;
                let _ = state
                    .machine
                    .consume(&CollectionMachineInput::FetchSucceeded);
                debug!(count = state.entries.len(), "Enrollment set refreshed");
            }
            Err(e) => {
                warn!(error = %e, "Error loading enrollments");
                self.transition(&CollectionMachineInput::FetchFailed);
                self.notifier
                    .error("Error loading enrollments", e.to_string());
            }
        }
    }

    /// Enroll the signed-in user in a course.
    ///
    /// Without a signed-in user this reports "Please sign in" and returns
    /// without contacting the backend. An existing enrollment reports
    /// "Already enrolled" and returns, an idempotent no-op from the caller's
    /// perspective. Otherwise inserts with `progress = 0`, reports the
    /// outcome, and refreshes the set; backend failures re-throw.
    pub async fn enroll_in_course(&self, course_id: &str) -> EnrollmentResult<()> {
        let Some(user) = self.identity.current_profile() else {
            self.notifier.error(
                "Please sign in",
                "You need to be signed in to enroll in courses.",
            );
            return Ok(());
        };

        let existing = match self.backend.find_enrollment(&user.id, course_id).await {
            Ok(existing) => existing,
            Err(e) => {
                self.notifier
                    .error("Error enrolling in course", e.to_string());
                return Err(e.into());
            }
        };

        if existing.is_some() {
            self.notifier.error(
                "Already enrolled",
                "You are already enrolled in this course.",
            );
            return Ok(());
        }

        self.transition(&CollectionMachineInput::MutationStarted);

        match self.backend.insert_enrollment(&user.id, course_id).await {
            Ok(enrollment) => {
                info!(
                    user_id = %user.id,
                    course_id = %course_id,
                    enrollment_id = %enrollment.id,
                    "Enrolled in course"
                );
                self.transition(&CollectionMachineInput::MutationSucceeded);
                self.notifier.success(
                    "Enrolled successfully",
                    "You can now access the course content!",
                );
                self.fetch_enrollments().await;
                Ok(())
            }
            Err(e) => {
                self.transition(&CollectionMachineInput::MutationFailed);
                self.notifier
                    .error("Error enrolling in course", e.to_string());
                Err(e.into())
            }
        }
    }

    /// Update an enrollment's progress by id, then refresh the set.
    ///
    /// Values outside [0, 100] are rejected with a validation error before
    /// any backend call. There is no optimistic local update; the set
    /// reflects the change only after the refresh completes.
    pub async fn update_progress(
        &self,
        enrollment_id: &str,
        progress: i32,
    ) -> EnrollmentResult<()> {
        if !(0..=100).contains(&progress) {
            self.notifier.error(
                "Invalid progress value",
                format!("Progress must be between 0 and 100, got {}.", progress),
            );
            return Err(EnrollmentError::InvalidProgress(progress));
        }

        self.transition(&CollectionMachineInput::MutationStarted);

        match self
            .backend
            .update_enrollment_progress(enrollment_id, progress)
            .await
        {
            Ok(()) => {
                self.transition(&CollectionMachineInput::MutationSucceeded);
                self.notifier
                    .success("Progress updated", format!("You are at {}%.", progress));
                self.fetch_enrollments().await;
                Ok(())
            }
            Err(e) => {
                self.transition(&CollectionMachineInput::MutationFailed);
                self.notifier
                    .error("Error updating progress", e.to_string());
                Err(e.into())
            }
        }
    }
}
