//! Gap-based session segmentation.
//!
//! # Algorithm Summary
//!
//! Walk a user's activities in start order, accumulating ids and elapsed time
//! into an open session. After each activity, compare its `answered_at` with
//! the next activity's `first_seen_at`; when the absolute gap exceeds the
//! threshold (or there is no next activity) the open session is closed.

use chrono::Duration;

use crate::activity::{Activity, DataError};
use crate::session::Session;
use crate::types::{ActivityId, DurationSeconds, Timestamp};

/// Configuration for session segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Largest gap between two activities that keeps them in one session.
    /// Default: 300 (5 minutes).
    pub gap_threshold_secs: u32,

    /// Reject activities whose `answered_at` precedes `first_seen_at`
    /// instead of segmenting them with a warning.
    /// Default: false.
    pub strict_timestamps: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gap_threshold_secs: 300, // 5 minutes
            strict_timestamps: false,
        }
    }
}

impl SessionConfig {
    fn gap_threshold(&self) -> Duration {
        Duration::seconds(i64::from(self.gap_threshold_secs))
    }
}

/// Session being accumulated.
#[derive(Debug)]
struct OpenSession {
    started_at: Timestamp,
    activity_ids: Vec<ActivityId>,
    duration: DurationSeconds,
}

impl OpenSession {
    const fn start(started_at: Timestamp) -> Self {
        Self {
            started_at,
            activity_ids: Vec::new(),
            duration: DurationSeconds::ZERO,
        }
    }

    fn push(&mut self, activity: &Activity) {
        self.activity_ids.push(activity.id.clone());
        self.duration += activity.elapsed();
    }

    fn close(self, ended_at: Timestamp) -> Session {
        Session {
            started_at: self.started_at,
            ended_at,
            activity_ids: self.activity_ids,
            duration_seconds: self.duration,
        }
    }
}

/// Splits one user's activities into sessions.
///
/// Activities must be sorted by `first_seen_at` ascending and belong to a
/// single user. An empty slice yields no sessions.
pub fn segment(activities: &[Activity], config: &SessionConfig) -> Result<Vec<Session>, DataError> {
    let threshold = config.gap_threshold();
    let mut sessions = Vec::new();
    let mut open: Option<OpenSession> = None;

    for (index, activity) in activities.iter().enumerate() {
        if activity.is_reversed() {
            if config.strict_timestamps {
                return Err(DataError::ReversedTimestamps {
                    id: activity.id.clone(),
                    first_seen_at: activity.first_seen_at.instant(),
                    answered_at: activity.answered_at.instant(),
                });
            }
            tracing::warn!(
                activity_id = %activity.id,
                first_seen_at = %activity.first_seen_at,
                answered_at = %activity.answered_at,
                "activity answered before it was first seen"
            );
        }

        open.get_or_insert_with(|| OpenSession::start(activity.first_seen_at.clone()))
            .push(activity);

        // The last activity compares against itself, which always closes.
        let next = activities.get(index + 1);
        let answered_at = activity.answered_at.instant();
        let boundary = next.map_or(answered_at, |next| next.first_seen_at.instant());
        let gap = (boundary - answered_at).abs();

        if gap > threshold || next.is_none() {
            if let Some(session) = open.take() {
                sessions.push(session.close(activity.answered_at.clone()));
            }
        }
    }

    Ok(sessions)
}
