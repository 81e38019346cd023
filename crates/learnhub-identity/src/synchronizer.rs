//! The identity synchronizer: one owner for the `{session, profile}` pair.
//!
//! Consumers read atomic snapshots; only this component (and the backend's
//! session-change notifications it subscribes to) mutate identity state.
//! Mutation outcomes are reported through the notification channel.

use crate::error::{IdentityError, IdentityResult};
use crate::fsm::{IdentityMachine, IdentityMachineInput, IdentityPhase};
use learnhub_backend::{
    MarketplaceApi, NewProfile, Session, SessionChange, UserProfile, UserRole,
};
use learnhub_core::Notifier;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Atomic view of the authenticated identity.
///
/// `loading` stays true until the first resolution completes; after that the
/// pair is replaced wholesale on every change, never field by field.
#[derive(Debug, Clone)]
pub struct IdentitySnapshot {
    /// The remote auth session, if any.
    pub session: Option<Session>,
    /// The local profile matching the session. Can be absent while a session
    /// exists (profile row missing or still unresolved).
    pub profile: Option<UserProfile>,
    /// True until the first resolution completes.
    pub loading: bool,
}

impl IdentitySnapshot {
    /// Returns true once a session is established.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The signed-in user's id, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }
}

/// Callback type for snapshot change notifications.
pub type SnapshotCallback = Box<dyn Fn(IdentitySnapshot) + Send + Sync>;

/// Owns identity state and reconciles it with the backend.
pub struct IdentitySynchronizer<B: MarketplaceApi> {
    backend: Arc<B>,
    notifier: Notifier,
    /// Internal FSM tracking the identity phase.
    fsm: Mutex<IdentityMachine>,
    /// Last published snapshot; replaced wholesale under the lock.
    snapshot: Mutex<IdentitySnapshot>,
    /// Optional callback for snapshot change notifications.
    callback: Mutex<Option<SnapshotCallback>>,
}

impl<B: MarketplaceApi> IdentitySynchronizer<B> {
    /// Create a new synchronizer. Call [`initialize`](Self::initialize) to
    /// perform the first resolution.
    pub fn new(backend: Arc<B>, notifier: Notifier) -> Self {
        Self {
            backend,
            notifier,
            fsm: Mutex::new(IdentityMachine::new()),
            snapshot: Mutex::new(IdentitySnapshot {
                session: None,
                profile: None,
                loading: true,
            }),
            callback: Mutex::new(None),
        }
    }

    /// Current identity phase.
    pub fn phase(&self) -> IdentityPhase {
        let fsm = self.fsm.lock().unwrap();
        IdentityPhase::from(fsm.state())
    }

    /// Current snapshot. Always internally consistent: the pair is replaced
    /// atomically, never observed mid-resolution.
    pub fn snapshot(&self) -> IdentitySnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    /// Set a callback to be notified whenever a new snapshot is published.
    pub fn set_state_callback(&self, callback: SnapshotCallback) {
        let mut cb = self.callback.lock().unwrap();
        *cb = Some(callback);
    }

    /// Transition the FSM, failing on an illegal input.
    fn transition(&self, input: &IdentityMachineInput) -> IdentityResult<IdentityPhase> {
        let mut fsm = self.fsm.lock().unwrap();
        let old_phase = IdentityPhase::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            IdentityError::InvalidTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_phase = IdentityPhase::from(fsm.state());
        if old_phase != new_phase {
            debug!(?old_phase, ?new_phase, "Identity phase transition");
        }
        Ok(new_phase)
    }

    /// Transition the FSM, tolerating an illegal input.
    ///
    /// Overlapping sign-in/sign-up calls are legal (the last notification to
    /// settle wins), so operation-driven inputs must not fail hard when a
    /// concurrent flow already moved the machine.
    fn transition_tolerant(&self, input: &IdentityMachineInput) {
        if let Err(e) = self.transition(input) {
            debug!(error = %e, "Tolerated identity transition");
        }
    }

    /// Replace the snapshot wholesale and notify the callback.
    fn publish(&self, session: Option<Session>, profile: Option<UserProfile>, loading: bool) {
        let snapshot = {
            let mut guard = self.snapshot.lock().unwrap();
            *guard = IdentitySnapshot {
                session,
                profile,
                loading,
            };
            guard.clone()
        };

        let cb = self.callback.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback(snapshot);
        }
    }

    /// First resolution: fetch the current session and, if present, the
    /// matching profile. Settles `loading = false` either way.
    pub async fn initialize(&self) -> IdentityResult<()> {
        let session = match self.backend.current_session().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to read current session on startup");
                None
            }
        };

        match session {
            Some(session) => {
                self.transition(&IdentityMachineInput::SessionFound)?;
                let profile = self.resolve_profile(&session).await;
                self.publish(Some(session), profile, false);
            }
            None => {
                self.transition(&IdentityMachineInput::NoSession)?;
                self.publish(None, None, false);
            }
        }

        Ok(())
    }

    /// Fetch the profile for a session, consuming the matching FSM input.
    ///
    /// A missing row or a failed fetch both settle as an absent profile; the
    /// session-level identity stands either way.
    async fn resolve_profile(&self, session: &Session) -> Option<UserProfile> {
        match self.backend.fetch_profile(&session.user_id).await {
            Ok(Some(profile)) => {
                self.transition_tolerant(&IdentityMachineInput::ProfileLoaded);
                Some(profile)
            }
            Ok(None) => {
                warn!(user_id = %session.user_id, "Session has no matching profile row");
                self.transition_tolerant(&IdentityMachineInput::ProfileMissing);
                None
            }
            Err(e) => {
                warn!(user_id = %session.user_id, error = %e, "Error fetching user profile");
                self.transition_tolerant(&IdentityMachineInput::ProfileMissing);
                None
            }
        }
    }

    /// Process one session-change notification cycle: re-resolve the pair
    /// and publish an atomic snapshot.
    pub async fn resolve_session_change(&self) {
        let session = match self.backend.current_session().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to read session during change resolution");
                None
            }
        };

        match session {
            Some(session) => {
                self.transition_tolerant(&IdentityMachineInput::SessionChanged);
                let profile = self.resolve_profile(&session).await;
                self.publish(Some(session), profile, false);
            }
            None => {
                self.transition_tolerant(&IdentityMachineInput::SessionGone);
                self.publish(None, None, false);
            }
        }
    }

    /// Create an account and mirror it with a profile row keyed by the new
    /// session's user id.
    ///
    /// Reports the outcome as a notification and re-throws failures so the
    /// calling UI can keep its dialog open. A profile-insert failure after a
    /// successful account creation is surfaced, not rolled back: deleting an
    /// auth account requires privileges this client must never hold.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> IdentityResult<()> {
        self.transition_tolerant(&IdentityMachineInput::SignUpAttempt);

        let session = match self.backend.sign_up(email, password).await {
            Ok(session) => session,
            Err(e) => {
                self.transition_tolerant(&IdentityMachineInput::SignUpFailed);
                self.notifier.error("Error creating account", e.to_string());
                return Err(e.into());
            }
        };

        let profile = NewProfile {
            id: session.user_id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };

        if let Err(e) = self.backend.insert_profile(profile).await {
            warn!(
                user_id = %session.user_id,
                error = %e,
                "Profile insert failed after account creation"
            );
            self.transition_tolerant(&IdentityMachineInput::SignUpSucceeded);
            self.notifier.error("Error creating account", e.to_string());
            return Err(e.into());
        }

        self.transition_tolerant(&IdentityMachineInput::SignUpSucceeded);
        self.notifier.success(
            "Account created successfully",
            "Please check your email to verify your account.",
        );
        Ok(())
    }

    /// Validate credentials. The profile is populated by the session-change
    /// subscription afterwards, not by this call; failure leaves state
    /// unchanged.
    pub async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<()> {
        self.transition_tolerant(&IdentityMachineInput::SignInAttempt);

        match self.backend.sign_in_with_password(email, password).await {
            Ok(_) => {
                self.transition_tolerant(&IdentityMachineInput::SignInSucceeded);
                self.notifier
                    .success("Signed in successfully", "Welcome back!");
                Ok(())
            }
            Err(e) => {
                self.transition_tolerant(&IdentityMachineInput::SignInFailed);
                self.notifier.error("Error signing in", e.to_string());
                Err(e.into())
            }
        }
    }

    /// Terminate the session. The profile becomes absent through the
    /// session-change subscription within one notification cycle.
    ///
    /// Failures are reported but not re-thrown; sign-out failures are
    /// non-fatal to the UI.
    pub async fn sign_out(&self) {
        self.transition_tolerant(&IdentityMachineInput::SignOutRequested);

        match self.backend.sign_out().await {
            Ok(()) => {
                self.notifier
                    .success("Signed out successfully", "See you next time!");
            }
            Err(e) => {
                warn!(error = %e, "Sign-out failed");
                self.notifier.error("Error signing out", e.to_string());
            }
        }
    }

    /// Obtain a session-change subscription from the backend.
    ///
    /// Take the receiver before triggering any auth mutation so no change is
    /// missed between subscribing and spawning the listener.
    pub fn subscribe_session_changes(&self) -> broadcast::Receiver<SessionChange> {
        self.backend.subscribe_session_changes()
    }

    /// Drive session-change notifications until the backend's channel closes.
    ///
    /// The presentation layer spawns this and holds a [`ListenerGuard`] so the
    /// subscription ends with the component that opened it.
    pub async fn run_session_listener(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<SessionChange>,
    ) {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    debug!(?change, "Session change notification");
                    self.resolve_session_change().await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session change stream lagged, re-resolving");
                    self.resolve_session_change().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

/// Scoped handle for the spawned session listener; aborts the task (and so
/// drops the subscription) when dropped.
pub struct ListenerGuard {
    handle: JoinHandle<()>,
}

impl ListenerGuard {
    /// Wrap a spawned listener task.
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
