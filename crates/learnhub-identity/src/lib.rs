//! Identity synchronization for LearnHub.
//!
//! This crate owns the mapping from a remote auth session to a local user
//! profile:
//! - Explicit FSM-based identity state tracking
//! - Atomic `{session, profile}` snapshots for read-only consumers
//! - Sign-up / sign-in / sign-out operations with user-visible notifications
//! - A session-change listener that re-resolves identity on every
//!   notification from the backend

mod error;
mod fsm;
mod synchronizer;

pub use error::{IdentityError, IdentityResult};
pub use fsm::identity_machine;
pub use fsm::{IdentityMachine, IdentityMachineInput, IdentityPhase};
pub use synchronizer::{
    IdentitySnapshot, IdentitySynchronizer, ListenerGuard, SnapshotCallback,
};
