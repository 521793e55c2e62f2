use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values below this are unix seconds, at or above it unix milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// Normalized event instant in unix milliseconds.
///
/// `0` is the "unknown" sentinel: every input that cannot be interpreted as a
/// positive instant collapses to it, and duration logic must skip it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const UNKNOWN: Timestamp = Timestamp(0);

    pub fn from_millis(millis: i64) -> Self {
        if millis > 0 {
            Timestamp(millis)
        } else {
            Self::UNKNOWN
        }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_millis(dt.timestamp_millis())
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    pub fn is_known(self) -> bool {
        self.0 > 0
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if !self.is_known() {
            return None;
        }
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// Milliseconds from `self` to `later`.
    ///
    /// None when either side is unknown or `later` precedes `self`.
    pub fn millis_until(self, later: Timestamp) -> Option<u64> {
        if !self.is_known() || !later.is_known() || later.0 < self.0 {
            return None;
        }
        Some((later.0 - self.0) as u64)
    }
}

/// Normalize a loosely-typed timestamp value (number, numeric string or date string).
pub fn normalize_timestamp(value: &Value) -> Timestamp {
    match value {
        Value::Number(n) => n.as_f64().map(from_epoch_number).unwrap_or_default(),
        Value::String(s) => parse_timestamp_str(s),
        _ => Timestamp::UNKNOWN,
    }
}

/// Parse a timestamp string: epoch numbers, RFC 3339, naive ISO-8601 (UTC) or a bare date.
pub fn parse_timestamp_str(raw: &str) -> Timestamp {
    let s = raw.trim();
    if s.is_empty() {
        return Timestamp::UNKNOWN;
    }

    if let Ok(n) = s.parse::<f64>() {
        return from_epoch_number(n);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Timestamp::from_datetime(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Timestamp::from_datetime(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Timestamp::from_datetime(naive.and_utc());
    }

    tracing::trace!(timestamp = s, "unparsable timestamp normalized to unknown");
    Timestamp::UNKNOWN
}

fn from_epoch_number(n: f64) -> Timestamp {
    if !n.is_finite() || n <= 0.0 {
        return Timestamp::UNKNOWN;
    }
    let millis = if n < MILLIS_THRESHOLD { n * 1000.0 } else { n };
    if millis >= i64::MAX as f64 {
        return Timestamp::UNKNOWN;
    }
    Timestamp::from_millis(millis.round() as i64)
}
