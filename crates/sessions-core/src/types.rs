//! Core type definitions with validation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Wire representation of an identifier.
///
/// Upstream records carry ids as either JSON integers or JSON strings.
/// The wire representation is kept so output matches input exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

/// An id as it appears when used as a JSON object key.
///
/// `1` and `"1"` produce the same key, `"01"` and `"+1"` do not. Numeric
/// keys order before text keys.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum IdKey<'a> {
    Number(i64),
    Text(&'a str),
}

impl IdValue {
    fn key(&self) -> IdKey<'_> {
        match self {
            Self::Number(n) => IdKey::Number(*n),
            Self::Text(text) => match text.parse::<i64>() {
                Ok(n) if n.to_string() == *text => IdKey::Number(n),
                _ => IdKey::Text(text),
            },
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Generates a validated identifier newtype with common trait implementations.
///
/// Equality, ordering and hashing go through [`IdValue::key`], so an id
/// sent as a number and the same id sent as a string are one id.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(try_from = "IdValue", into = "IdValue")]
        pub struct $name(IdValue);

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.key() == other.0.key()
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.key().hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.key().cmp(&other.0.key())
            }
        }

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(value: IdValue) -> Result<Self, ValidationError> {
                if matches!(&value, IdValue::Text(text) if text.is_empty()) {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(value))
            }

            /// Creates a textual ID after validation.
            pub fn text(id: impl Into<String>) -> Result<Self, ValidationError> {
                Self::new(IdValue::Text(id.into()))
            }

            /// Returns the underlying wire value.
            pub const fn value(&self) -> &IdValue {
                &self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(IdValue::Number(id))
            }
        }

        impl TryFrom<IdValue> for $name {
            type Error = ValidationError;

            fn try_from(value: IdValue) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for IdValue {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// A validated activity identifier.
    ///
    /// Activity IDs are integers or non-empty strings. Uniqueness is not
    /// enforced; duplicates are carried through as given.
    ActivityId, "activity ID"
);

define_id!(
    /// A validated user identifier, the grouping key for sessions.
    UserId, "user ID"
);

/// An instant read from an ISO 8601 string, together with that string.
///
/// Equality and ordering use the instant. Serialization echoes the text the
/// instant was parsed from.
#[derive(Debug, Clone)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    text: String,
}

impl Timestamp {
    /// Parses `text`, handing it back unchanged when it is not a timestamp.
    pub fn parse(text: String) -> Result<Self, String> {
        match parse_timestamp(&text) {
            Some(instant) => Ok(Self { instant, text }),
            None => Err(text),
        }
    }

    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            text: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Offset-less layouts, read as UTC. A trailing `Z` is stripped first.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Minute-precision layouts carrying a numeric offset.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

/// Parses an ISO 8601 timestamp.
///
/// Accepts RFC 3339 with any offset, minute precision with or without an
/// offset, and a bare calendar date (midnight UTC). A value without an
/// offset is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = value.strip_suffix('Z').unwrap_or(value);
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// A non-negative span of time measured in whole milliseconds.
///
/// Serialized as seconds: an integer when the span is a whole number of
/// seconds (`20`), otherwise a decimal (`1.5`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DurationSeconds(i64);

impl DurationSeconds {
    pub const ZERO: Self = Self(0);

    /// Builds a duration from the magnitude of a time delta.
    #[must_use]
    pub fn from_delta(delta: TimeDelta) -> Self {
        Self(delta.num_milliseconds().saturating_abs())
    }

    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms.saturating_abs())
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "session durations are far below 2^52 ms"
    )]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl Add for DurationSeconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for DurationSeconds {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Serialize for DurationSeconds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0 % 1000 == 0 {
            serializer.serialize_i64(self.0 / 1000)
        } else {
            serializer.serialize_f64(self.as_secs_f64())
        }
    }
}

impl fmt::Display for DurationSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{}s", self.0 / 1000)
        } else {
            write!(f, "{}s", self.as_secs_f64())
        }
    }
}
