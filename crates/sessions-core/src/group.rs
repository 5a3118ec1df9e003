//! Partitioning of ordered activities by user.

use std::collections::BTreeMap;

use crate::activity::Activity;
use crate::types::UserId;

/// Activities keyed by user, each list in input order.
pub type ActivitiesByUser = BTreeMap<UserId, Vec<Activity>>;

/// Splits activities into per-user lists, preserving relative order.
///
/// Only users present in the input get an entry.
pub fn group_by_user(activities: Vec<Activity>) -> ActivitiesByUser {
    activities
        .into_iter()
        .fold(BTreeMap::new(), |mut groups, activity| {
            groups
                .entry(activity.user_id.clone())
                .or_insert_with(Vec::new)
                .push(activity);
            groups
        })
}
