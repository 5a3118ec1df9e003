//! Activity records: the wire shape, validation, and the checked form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ActivityId, DurationSeconds, IdValue, Timestamp, UserId, ValidationError};

/// Malformed or inconsistent activity data.
///
/// `index` is the position of the offending record in the input list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("activity at index {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("activity at index {index}: invalid `{field}`: {source}")]
    InvalidId {
        index: usize,
        field: &'static str,
        source: ValidationError,
    },

    #[error("activity at index {index}: unparseable `{field}` timestamp {value:?}")]
    InvalidTimestamp {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("activity {id}: answered_at {answered_at} precedes first_seen_at {first_seen_at}")]
    ReversedTimestamps {
        id: ActivityId,
        first_seen_at: DateTime<Utc>,
        answered_at: DateTime<Utc>,
    },
}

/// An activity exactly as received, before any presence checks.
///
/// Unknown fields are ignored. Every known field is optional here so that
/// absence is reported with the record's index instead of failing the
/// whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<IdValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<String>,
}

/// Response body of the activities endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitiesPayload {
    pub activities: Vec<RawActivity>,
}

/// A validated unit of user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: UserId,
    pub first_seen_at: Timestamp,
    pub answered_at: Timestamp,
}

impl Activity {
    /// Time between start and completion, regardless of their order.
    pub fn elapsed(&self) -> DurationSeconds {
        DurationSeconds::from_delta(self.answered_at.instant() - self.first_seen_at.instant())
    }

    /// True when the completion time precedes the start time.
    pub fn is_reversed(&self) -> bool {
        self.answered_at < self.first_seen_at
    }
}

impl RawActivity {
    /// Checks presence and format of every required field.
    pub fn validate(self, index: usize) -> Result<Activity, DataError> {
        let id = self
            .id
            .ok_or(DataError::MissingField { index, field: "id" })?;
        let id = ActivityId::new(id).map_err(|source| DataError::InvalidId {
            index,
            field: "id",
            source,
        })?;

        let user_id = self.user_id.ok_or(DataError::MissingField {
            index,
            field: "user_id",
        })?;
        let user_id = UserId::new(user_id).map_err(|source| DataError::InvalidId {
            index,
            field: "user_id",
            source,
        })?;

        let first_seen_at = required_timestamp(self.first_seen_at, index, "first_seen_at")?;
        let answered_at = required_timestamp(self.answered_at, index, "answered_at")?;

        Ok(Activity {
            id,
            user_id,
            first_seen_at,
            answered_at,
        })
    }
}

fn required_timestamp(
    value: Option<String>,
    index: usize,
    field: &'static str,
) -> Result<Timestamp, DataError> {
    let value = value.ok_or(DataError::MissingField { index, field })?;
    Timestamp::parse(value).map_err(|value| DataError::InvalidTimestamp {
        index,
        field,
        value,
    })
}
