//! Core types for the vocabulary scheduler.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParsePerformanceError;

/// Milliseconds in one scheduling day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Ease factor assigned to items that have never been reviewed.
pub const DEFAULT_EASE: f64 = 2.5;

/// Hard floor for the ease factor.
pub const MINIMUM_EASE: f64 = 1.3;

/// Interval assigned to items that have never been reviewed.
pub const DEFAULT_INTERVAL: u32 = 1;

/// Learner's self-assessed recall quality, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    #[serde(alias = "Again")]
    Again,
    #[serde(alias = "Hard")]
    Hard,
    #[serde(alias = "Good")]
    Good,
    #[serde(alias = "Easy")]
    Easy,
}

impl Performance {
    /// All grades, worst first.
    pub const ALL: [Performance; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Wire name of the grade.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Performance {
    type Err = ParsePerformanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            _ => Err(ParsePerformanceError(s.to_string())),
        }
    }
}

/// Label shown for the most recent grade; `"none"` when nothing was graded.
pub fn performance_label(performance: Option<Performance>) -> &'static str {
    performance.map_or("none", Performance::as_str)
}

/// Persisted review record for one vocabulary item.
///
/// Fields are private so `next_review_at` can only ever be derived from
/// `last_reviewed_at + interval`. Deserialization never fails on bad field
/// values: missing or malformed fields are replaced by the new-item defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredReviewState")]
pub struct ReviewState {
    interval: u32,
    ease_factor: f64,
    repetitions: u32,
    #[serde(serialize_with = "chrono::serde::ts_milliseconds::serialize")]
    last_reviewed_at: DateTime<Utc>,
    #[serde(serialize_with = "chrono::serde::ts_milliseconds::serialize")]
    next_review_at: DateTime<Utc>,
    last_performance: Option<Performance>,
}

impl ReviewState {
    /// Build a state, enforcing `interval >= 1` and `ease_factor >= 1.3`.
    pub fn new(
        interval: u32,
        ease_factor: f64,
        repetitions: u32,
        last_reviewed_at: DateTime<Utc>,
        last_performance: Option<Performance>,
    ) -> Self {
        let interval = interval.max(1);
        let ease_factor = if ease_factor.is_finite() {
            ease_factor.max(MINIMUM_EASE)
        } else {
            DEFAULT_EASE
        };

        Self {
            interval,
            ease_factor,
            repetitions,
            last_reviewed_at,
            next_review_at: add_days(last_reviewed_at, interval),
            last_performance,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn ease_factor(&self) -> f64 {
        self.ease_factor
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn last_reviewed_at(&self) -> DateTime<Utc> {
        self.last_reviewed_at
    }

    pub fn next_review_at(&self) -> DateTime<Utc> {
        self.next_review_at
    }

    pub fn last_performance(&self) -> Option<Performance> {
        self.last_performance
    }
}

/// `start + days`, saturating at the end of the representable range.
pub(crate) fn add_days(start: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    start
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn sub_days(end: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    end.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Raw on-disk shape of a review record. Every field is optional and
/// tolerant of wrong types so one corrupted record cannot fail a load.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredReviewState {
    #[serde(deserialize_with = "lenient")]
    interval: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    ease_factor: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    repetitions: Option<f64>,
    #[serde(deserialize_with = "lenient_timestamp")]
    last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_timestamp")]
    next_review_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient")]
    last_performance: Option<Performance>,
}

impl From<StoredReviewState> for ReviewState {
    fn from(raw: StoredReviewState) -> Self {
        let interval = raw
            .interval
            .filter(|v| v.is_finite())
            .map(|v| v.round().max(1.0) as u32)
            .unwrap_or(DEFAULT_INTERVAL);
        let ease_factor = raw
            .ease_factor
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_EASE);
        let repetitions = raw
            .repetitions
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u32)
            .unwrap_or(0);

        let last_reviewed_at = match (raw.last_reviewed_at, raw.next_review_at) {
            (Some(last), _) => last,
            (None, Some(next)) => sub_days(next, interval),
            (None, None) => DateTime::<Utc>::UNIX_EPOCH,
        };

        ReviewState::new(
            interval,
            ease_factor,
            repetitions,
            last_reviewed_at,
            raw.last_performance,
        )
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_timestamp(&value))
}

/// Accepts epoch milliseconds (integer or float) or an RFC 3339 string.
pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

/// Read-only projection of an item's review state for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatus {
    pub is_new: bool,
    pub is_due: bool,
    /// Whole days until the item is due; zero or negative once due.
    pub days_until_due: i64,
    pub repetitions: u32,
    pub ease_factor: f64,
    #[serde(serialize_with = "serialize_performance_label")]
    pub last_performance: Option<Performance>,
}

fn serialize_performance_label<S>(
    performance: &Option<Performance>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(performance_label(*performance))
}
