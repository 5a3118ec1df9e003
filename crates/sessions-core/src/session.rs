//! Computed sessions and the output payload.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{ActivityId, DurationSeconds, Timestamp, UserId};

/// A contiguous run of one user's activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// `first_seen_at` of the first member activity, as received.
    pub started_at: Timestamp,
    /// `answered_at` of the last member activity, as received.
    pub ended_at: Timestamp,
    /// Member activity ids in chronological order.
    pub activity_ids: Vec<ActivityId>,
    /// Sum of per-activity elapsed time.
    pub duration_seconds: DurationSeconds,
}

/// Sessions per user, each list in chronological order.
pub type SessionsByUser = BTreeMap<UserId, Vec<Session>>;

/// Serialized result of one run, also the body submitted to the sessions endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionsPayload {
    pub user_sessions: SessionsByUser,
}

impl SessionsPayload {
    /// Total number of sessions across all users.
    pub fn session_count(&self) -> usize {
        self.user_sessions.values().map(Vec::len).sum()
    }
}
