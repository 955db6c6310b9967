//! Core data types for wellness analytics
//!
//! - `DateKey`: calendar-day join key for independently collected series
//! - `Timestamp` / `Entry`: raw tracker records as handed over by the trackers
//! - `MetricKind`: which tracker a series comes from
//! - `Aggregation`: how several same-day samples collapse into one value
//! - `DateWindow`: inclusive range of days to analyze

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Naive date-time layouts accepted in addition to RFC 3339
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar-day identifier (year-month-day).
///
/// Time-of-day is truncated; two timestamps on the same calendar day map to
/// the same key. Serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Create a key from calendar components, `None` if the date is invalid
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today's key in UTC
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    /// Key for a Unix timestamp in milliseconds (UTC calendar day)
    pub fn from_millis(millis: i64) -> AnalyticsResult<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(|dt| Self(dt.date_naive()))
            .ok_or(AnalyticsError::TimestampOutOfRange(millis))
    }

    /// Parse a pre-formatted date or a full date-time.
    ///
    /// Accepts `YYYY-MM-DD`, RFC 3339 (the calendar date as written, offset
    /// ignored), naive `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]`, and bare integer
    /// millisecond timestamps.
    pub fn parse(s: &str) -> AnalyticsResult<Self> {
        let s = s.trim();

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self(date));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.date_naive()));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self(dt.date()));
            }
        }

        if let Ok(millis) = s.parse::<i64>() {
            return Self::from_millis(millis);
        }

        Err(AnalyticsError::InvalidTimestamp(s.to_string()))
    }

    /// Key for any raw tracker timestamp
    pub fn from_timestamp(timestamp: &Timestamp) -> AnalyticsResult<Self> {
        match timestamp {
            Timestamp::Millis(millis) => Self::from_millis(*millis),
            Timestamp::Text(text) => Self::parse(text),
        }
    }

    /// The key `days` days earlier (later for negative `days`), saturating
    /// at the ends of the supported calendar range
    pub fn days_before(&self, days: i64) -> Self {
        let offset = Days::new(days.unsigned_abs());
        if days >= 0 {
            Self(self.0.checked_sub_days(offset).unwrap_or(NaiveDate::MIN))
        } else {
            Self(self.0.checked_add_days(offset).unwrap_or(NaiveDate::MAX))
        }
    }

    /// Underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for DateKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Raw timestamp of a tracker entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Unix timestamp in milliseconds
    Millis(i64),
    /// Date or date-time text
    Text(String),
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp::Millis(millis)
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Timestamp::Text(text.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(text: String) -> Self {
        Timestamp::Text(text)
    }
}

impl From<DateKey> for Timestamp {
    fn from(key: DateKey) -> Self {
        Timestamp::Text(key.to_string())
    }
}

/// A single raw tracker record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Entry {
    pub fn new(timestamp: impl Into<Timestamp>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }

    /// Calendar day this entry belongs to
    pub fn date_key(&self) -> AnalyticsResult<DateKey> {
        DateKey::from_timestamp(&self.timestamp)
    }
}

/// Which tracker a series comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Mood rating (1-10)
    Mood,
    /// Sleep quality rating (1-10)
    Sleep,
    /// Exercise duration (minutes)
    Exercise,
}

impl MetricKind {
    pub fn all() -> &'static [MetricKind] {
        &[MetricKind::Mood, MetricKind::Sleep, MetricKind::Exercise]
    }

    /// How same-day samples are combined before alignment
    pub fn daily_aggregation(&self) -> Aggregation {
        match self {
            MetricKind::Mood | MetricKind::Sleep => Aggregation::Average,
            MetricKind::Exercise => Aggregation::Sum,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Mood | MetricKind::Sleep => "1-10",
            MetricKind::Exercise => "minutes",
        }
    }

    /// Phrase used in narrative text
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Mood => "mood",
            MetricKind::Sleep => "sleep quality",
            MetricKind::Exercise => "exercise",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Mood => write!(f, "mood"),
            MetricKind::Sleep => write!(f, "sleep"),
            MetricKind::Exercise => write!(f, "exercise"),
        }
    }
}

impl FromStr for MetricKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mood" => Ok(MetricKind::Mood),
            "sleep" | "sleep_quality" => Ok(MetricKind::Sleep),
            "exercise" | "exercise_minutes" => Ok(MetricKind::Exercise),
            other => Err(AnalyticsError::UnknownMetric(other.to_string())),
        }
    }
}

/// How to collapse several samples of the same day into one value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Sum values (exercise minutes)
    Sum,
    /// Average values (mood, sleep quality)
    Average,
    /// Use the last value recorded that day
    Last,
    Max,
    Min,
    /// Count of samples
    Count,
}

impl Aggregation {
    /// Aggregate a slice of values according to this type
    pub fn aggregate(&self, values: &[f64]) -> Option<f64> {
        let last = *values.last()?;

        Some(match self {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Average => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Last => last,
            Aggregation::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            Aggregation::Count => values.len() as f64,
        })
    }
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: DateKey,
    pub end: DateKey,
}

impl DateWindow {
    /// The last `days` days ending at (and including) `as_of`.
    ///
    /// A zero-day window contains nothing.
    pub fn last_days(as_of: DateKey, days: u32) -> Self {
        Self {
            start: as_of.days_before(i64::from(days) - 1),
            end: as_of,
        }
    }

    pub fn contains(&self, key: DateKey) -> bool {
        key >= self.start && key <= self.end
    }
}
