//! Validation and chronological ordering of incoming activities.

use crate::activity::{Activity, DataError, RawActivity};

/// Validates every record, failing on the first malformed one.
pub fn validate(raw: Vec<RawActivity>) -> Result<Vec<Activity>, DataError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}

/// Orders activities by `first_seen_at` ascending.
///
/// The sort is stable: activities sharing a start time keep their input order.
pub fn sort_ascending_by_start(mut activities: Vec<Activity>) -> Vec<Activity> {
    activities.sort_by_key(|activity| activity.first_seen_at.instant());
    activities
}

/// Validates then sorts raw records.
pub fn normalize(raw: Vec<RawActivity>) -> Result<Vec<Activity>, DataError> {
    let activities = validate(raw)?;
    tracing::debug!(count = activities.len(), "validated activities");
    Ok(sort_ascending_by_start(activities))
}
