//! Per-user session assembly.

use rayon::prelude::*;

use crate::activity::{DataError, RawActivity};
use crate::group::{ActivitiesByUser, group_by_user};
use crate::normalize::normalize;
use crate::segment::{SessionConfig, segment};
use crate::session::{Session, SessionsByUser, SessionsPayload};
use crate::types::UserId;

/// Segments every user's activities and composes the per-user mapping.
///
/// Users are segmented in parallel. When several users have bad data, the
/// error reported is the one for the lowest user id.
pub fn build(groups: ActivitiesByUser, config: &SessionConfig) -> Result<SessionsByUser, DataError> {
    let segmented: Vec<Result<(UserId, Vec<Session>), DataError>> = groups
        .into_par_iter()
        .map(|(user_id, activities)| {
            segment(&activities, config).map(|sessions| (user_id, sessions))
        })
        .collect();

    segmented.into_iter().collect()
}

/// Runs the full computation: validate, sort, group, segment.
///
/// Either every user's sessions are returned or nothing is.
pub fn compute_sessions(
    raw: Vec<RawActivity>,
    config: &SessionConfig,
) -> Result<SessionsPayload, DataError> {
    let activities = normalize(raw)?;
    let groups = group_by_user(activities);
    tracing::debug!(users = groups.len(), "grouped activities by user");

    let user_sessions = build(groups, config)?;
    let payload = SessionsPayload { user_sessions };
    tracing::debug!(
        users = payload.user_sessions.len(),
        sessions = payload.session_count(),
        "computed sessions"
    );
    Ok(payload)
}
