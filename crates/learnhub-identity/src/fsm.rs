//! Identity state machine using rust-fsm.
//!
//! Tracks how the pair `{session, profile}` is being reconciled. Session
//! change notifications (`SessionChanged` / `SessionGone`) are accepted from
//! every state: the subscription re-resolves identity no matter what was in
//! flight, and the last notification to settle wins.
//!
//! ## State Diagram
//!
//! ```text
//! ┌──────────┐ SessionFound ┌──────────────────┐
//! │ Starting │ ───────────► │ ResolvingProfile │ ◄── SessionChanged (any state)
//! └────┬─────┘              └────────┬─────────┘
//!      │ NoSession                   │ ProfileLoaded / ProfileMissing
//!      ▼                             ▼
//! ┌───────────┐  SignInAttempt  ┌──────────┐ SignOutRequested ┌────────────┐
//! │ SignedOut │ ──────────────► │ SignedIn │ ───────────────► │ SigningOut │
//! └───────────┘  (via SigningIn └──────────┘                  └─────┬──────┘
//!      ▲          or SigningUp)                                     │
//!      └──────────────── SessionGone (any state) / SignOutComplete ─┘
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Declarative machine; generates the `identity_machine` module with
// State/Input enums and the StateMachine type alias.
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub identity_machine(Starting)

    Starting => {
        SessionFound => ResolvingProfile,
        NoSession => SignedOut,
        SessionChanged => ResolvingProfile,
        SessionGone => SignedOut
    },
    SignedOut => {
        SignInAttempt => SigningIn,
        SignUpAttempt => SigningUp,
        SessionChanged => ResolvingProfile,
        SessionGone => SignedOut
    },
    SigningIn => {
        SignInSucceeded => ResolvingProfile,
        SignInFailed => SignedOut,
        SessionChanged => ResolvingProfile,
        SessionGone => SignedOut
    },
    SigningUp => {
        SignUpSucceeded => ResolvingProfile,
        SignUpFailed => SignedOut,
        SessionChanged => ResolvingProfile,
        SessionGone => SignedOut
    },
    ResolvingProfile => {
        ProfileLoaded => SignedIn,
        ProfileMissing => SignedIn,
        SessionChanged => ResolvingProfile,
        SessionGone => SignedOut
    },
    SignedIn => {
        SignOutRequested => SigningOut,
        SessionChanged => ResolvingProfile,
        SessionGone => SignedOut
    },
    SigningOut => {
        SignOutComplete => SignedOut,
        SessionChanged => ResolvingProfile,
        SessionGone => SignedOut
    }
}

pub use identity_machine::Input as IdentityMachineInput;
pub use identity_machine::StateMachine as IdentityMachine;

/// User-friendly identity phase for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPhase {
    /// First resolution has not completed yet.
    Starting,
    /// No session; nothing in flight.
    SignedOut,
    /// A sign-in request is in flight.
    SigningIn,
    /// A sign-up request is in flight.
    SigningUp,
    /// A session exists; its profile is being fetched.
    ResolvingProfile,
    /// A session exists and resolution has settled (the profile may still be
    /// absent, see the sign-up partial-failure window).
    SignedIn,
    /// A sign-out request is in flight.
    SigningOut,
}

impl IdentityPhase {
    /// Returns true once a session-level identity is established.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, IdentityPhase::SignedIn)
    }

    /// Returns true if the phase is a transient/in-progress state.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IdentityPhase::Starting
                | IdentityPhase::SigningIn
                | IdentityPhase::SigningUp
                | IdentityPhase::ResolvingProfile
                | IdentityPhase::SigningOut
        )
    }
}

impl From<&identity_machine::State> for IdentityPhase {
    fn from(state: &identity_machine::State) -> Self {
        match state {
            identity_machine::State::Starting => IdentityPhase::Starting,
            identity_machine::State::SignedOut => IdentityPhase::SignedOut,
            identity_machine::State::SigningIn => IdentityPhase::SigningIn,
            identity_machine::State::SigningUp => IdentityPhase::SigningUp,
            identity_machine::State::ResolvingProfile => IdentityPhase::ResolvingProfile,
            identity_machine::State::SignedIn => IdentityPhase::SignedIn,
            identity_machine::State::SigningOut => IdentityPhase::SigningOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(machine: &IdentityMachine) -> IdentityPhase {
        IdentityPhase::from(machine.state())
    }

    #[test]
    fn test_initial_state_is_starting() {
        let machine = IdentityMachine::new();
        assert_eq!(phase(&machine), IdentityPhase::Starting);
    }

    #[test]
    fn test_startup_with_session_resolves_profile() {
        let mut machine = IdentityMachine::new();

        machine.consume(&IdentityMachineInput::SessionFound).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::ResolvingProfile);

        machine.consume(&IdentityMachineInput::ProfileLoaded).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SignedIn);
    }

    #[test]
    fn test_startup_without_session() {
        let mut machine = IdentityMachine::new();

        machine.consume(&IdentityMachineInput::NoSession).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SignedOut);
    }

    #[test]
    fn test_sign_in_flow() {
        let mut machine = IdentityMachine::new();
        machine.consume(&IdentityMachineInput::NoSession).unwrap();

        machine.consume(&IdentityMachineInput::SignInAttempt).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SigningIn);

        machine.consume(&IdentityMachineInput::SignInSucceeded).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::ResolvingProfile);

        machine.consume(&IdentityMachineInput::ProfileLoaded).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SignedIn);
    }

    #[test]
    fn test_sign_in_failure_returns_to_signed_out() {
        let mut machine = IdentityMachine::new();
        machine.consume(&IdentityMachineInput::NoSession).unwrap();

        machine.consume(&IdentityMachineInput::SignInAttempt).unwrap();
        machine.consume(&IdentityMachineInput::SignInFailed).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SignedOut);
    }

    #[test]
    fn test_sign_up_flow_with_missing_profile_still_settles() {
        let mut machine = IdentityMachine::new();
        machine.consume(&IdentityMachineInput::NoSession).unwrap();

        machine.consume(&IdentityMachineInput::SignUpAttempt).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SigningUp);

        machine.consume(&IdentityMachineInput::SignUpSucceeded).unwrap();
        // Profile insert failed after account creation; identity still
        // settles at the session level.
        machine.consume(&IdentityMachineInput::ProfileMissing).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SignedIn);
    }

    #[test]
    fn test_sign_out_flow() {
        let mut machine = IdentityMachine::new();
        machine.consume(&IdentityMachineInput::SessionFound).unwrap();
        machine.consume(&IdentityMachineInput::ProfileLoaded).unwrap();

        machine.consume(&IdentityMachineInput::SignOutRequested).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SigningOut);

        machine.consume(&IdentityMachineInput::SignOutComplete).unwrap();
        assert_eq!(phase(&machine), IdentityPhase::SignedOut);
    }

    #[test]
    fn test_session_change_is_accepted_from_every_state() {
        // Every state must accept SessionChanged and SessionGone; the
        // subscription re-resolves regardless of what was in flight.
        let reachable: Vec<Vec<IdentityMachineInput>> = vec![
            vec![],                                           // Starting
            vec![IdentityMachineInput::NoSession],            // SignedOut
            vec![
                IdentityMachineInput::NoSession,
                IdentityMachineInput::SignInAttempt,
            ], // SigningIn
            vec![
                IdentityMachineInput::NoSession,
                IdentityMachineInput::SignUpAttempt,
            ], // SigningUp
            vec![IdentityMachineInput::SessionFound],         // ResolvingProfile
            vec![
                IdentityMachineInput::SessionFound,
                IdentityMachineInput::ProfileLoaded,
            ], // SignedIn
            vec![
                IdentityMachineInput::SessionFound,
                IdentityMachineInput::ProfileLoaded,
                IdentityMachineInput::SignOutRequested,
            ], // SigningOut
        ];

        let build = |path: &[IdentityMachineInput]| {
            let mut machine = IdentityMachine::new();
            for input in path {
                machine.consume(input).unwrap();
            }
            machine
        };

        for path in reachable {
            let mut changed = build(&path);
            changed.consume(&IdentityMachineInput::SessionChanged).unwrap();
            assert_eq!(phase(&changed), IdentityPhase::ResolvingProfile);

            let mut gone = build(&path);
            gone.consume(&IdentityMachineInput::SessionGone).unwrap();
            assert_eq!(phase(&gone), IdentityPhase::SignedOut);
        }
    }

    #[test]
    fn test_invalid_transition_returns_error() {
        let mut machine = IdentityMachine::new();

        // Can't sign in before the first resolution settles.
        assert!(machine
            .consume(&IdentityMachineInput::SignInAttempt)
            .is_err());

        // Can't claim a profile without a session.
        machine.consume(&IdentityMachineInput::NoSession).unwrap();
        assert!(machine
            .consume(&IdentityMachineInput::ProfileLoaded)
            .is_err());
    }

    #[test]
    fn test_phase_is_authenticated() {
        assert!(IdentityPhase::SignedIn.is_authenticated());
        assert!(!IdentityPhase::SignedOut.is_authenticated());
        assert!(!IdentityPhase::ResolvingProfile.is_authenticated());
    }

    #[test]
    fn test_phase_is_transient() {
        assert!(IdentityPhase::Starting.is_transient());
        assert!(IdentityPhase::SigningIn.is_transient());
        assert!(IdentityPhase::SigningUp.is_transient());
        assert!(IdentityPhase::ResolvingProfile.is_transient());
        assert!(IdentityPhase::SigningOut.is_transient());
        assert!(!IdentityPhase::SignedIn.is_transient());
        assert!(!IdentityPhase::SignedOut.is_transient());
    }
}
