//! Remote backend client for LearnHub.
//!
//! This crate provides:
//! - The `MarketplaceApi` trait, the full contract the stores consume
//! - `SupabaseBackend`, the production implementation speaking GoTrue
//!   (`/auth/v1`) and PostgREST (`/rest/v1`) over HTTP
//! - Session persistence behind the `SessionStore` trait
//! - Session-change broadcasting for the identity synchronizer

mod api;
mod auth;
mod client;
mod error;
mod session;
mod types;

pub use api::MarketplaceApi;
pub use auth::RefreshConfig;
pub use client::SupabaseBackend;
pub use error::{BackendError, BackendResult, StoreError, StoreResult};
pub use session::{FileSessionStore, Session, SessionChange, SessionStore};
pub use types::{
    Course, CourseLevel, CourseUpdate, EnrolledCourse, Enrollment, NewCourse, NewProfile,
    UserProfile, UserRole,
};
