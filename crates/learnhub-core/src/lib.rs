//! Core types, configuration, and utilities shared across LearnHub crates.
//!
//! This crate provides:
//! - Configuration with compile-time backend defaults
//! - File system paths under `~/.learnhub`
//! - Logging initialization
//! - The user-visible notification channel
//! - The shared collection-store state machine

mod collection;
mod config;
mod error;
mod logging;
mod notify;
mod paths;

pub use collection::collection_machine;
pub use collection::{CollectionMachine, CollectionMachineInput, CollectionPhase};
pub use config::{Config, DEFAULT_LOG_LEVEL, DEFAULT_SUPABASE_PUBLISHABLE_KEY, DEFAULT_SUPABASE_URL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use notify::{Notification, NotificationKind, Notifier};
pub use paths::Paths;
