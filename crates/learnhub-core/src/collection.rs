//! Collection-store state machine shared by the course directory and the
//! enrollment ledger.
//!
//! Both stores follow the same lifecycle: a wholesale fetch replaces the
//! cache, a mutation goes to the backend first and re-enters fetching on
//! success. There is no partial or optimistic state.
//!
//! ```text
//! ┌──────┐ FetchStarted ┌──────────┐ FetchSucceeded ┌───────────┐
//! │ Idle │ ───────────► │ Fetching │ ─────────────► │ Populated │
//! └──────┘              └─────┬────┘                └─────┬─────┘
//!                             │ FetchFailed               │ MutationStarted
//!                             ▼                           ▼
//!                       ┌────────┐                  ┌──────────┐
//!                       │ Failed │ ◄── (refetch) ── │ Mutating │
//!                       └────────┘                  └──────────┘
//!        Mutating ─MutationSucceeded→ Fetching (refresh re-derives state)
//!        Mutating ─MutationFailed→ Populated (stale cache kept)
//! ```

use rust_fsm::*;

// Declarative machine; generates the `collection_machine` module with
// State/Input enums and the StateMachine type alias.
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub collection_machine(Idle)

    Idle => {
        FetchStarted => Fetching
    },
    Fetching => {
        // A superseding refresh may start while one is in flight; the last
        // one to resolve wins (no cancellation).
        FetchStarted => Fetching,
        FetchSucceeded => Populated,
        FetchFailed => Failed
    },
    Populated => {
        FetchStarted => Fetching,
        MutationStarted => Mutating
    },
    Failed => {
        FetchStarted => Fetching,
        MutationStarted => Mutating
    },
    Mutating => {
        MutationSucceeded => Fetching,
        MutationFailed => Populated
    }
}

pub use collection_machine::Input as CollectionMachineInput;
pub use collection_machine::StateMachine as CollectionMachine;

/// Simplified view of the collection lifecycle for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionPhase {
    /// Nothing fetched yet.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// The cache holds the last successful fetch.
    Populated,
    /// The last fetch failed; the cache may be stale or empty.
    Failed,
    /// A mutation is in flight.
    Mutating,
}

impl CollectionPhase {
    /// Returns true while a backend operation is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, CollectionPhase::Fetching | CollectionPhase::Mutating)
    }
}

impl From<&collection_machine::State> for CollectionPhase {
    fn from(state: &collection_machine::State) -> Self {
        match state {
            collection_machine::State::Idle => CollectionPhase::Idle,
            collection_machine::State::Fetching => CollectionPhase::Fetching,
            collection_machine::State::Populated => CollectionPhase::Populated,
            collection_machine::State::Failed => CollectionPhase::Failed,
            collection_machine::State::Mutating => CollectionPhase::Mutating,
        }
    }
}
