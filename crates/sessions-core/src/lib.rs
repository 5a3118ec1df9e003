//! Core domain logic for activity sessions.
//!
//! This crate contains the fundamental types and logic for:
//! - Validation: turning raw activity records into checked activities
//! - Normalization and grouping: ordering activities and splitting them by user
//! - Segmentation: cutting each user's activities into gap-separated sessions
//!
//! It performs no I/O.

mod activity;
mod aggregate;
mod group;
mod normalize;
mod segment;
mod session;
pub mod types;

pub use activity::{ActivitiesPayload, Activity, DataError, RawActivity};
pub use aggregate::{build, compute_sessions};
pub use group::{ActivitiesByUser, group_by_user};
pub use normalize::{normalize, sort_ascending_by_start, validate};
pub use segment::{SessionConfig, segment};
pub use session::{Session, SessionsByUser, SessionsPayload};
pub use types::{
    ActivityId, DurationSeconds, IdValue, Timestamp, UserId, ValidationError, parse_timestamp,
};
