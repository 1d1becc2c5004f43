//! # Temporal Types — UTC Construction Timestamps
//!
//! A leaf built from a raw value records the wall-clock time of that
//! construction. Instances rebuilt from a commitment, and composite
//! instances, carry no timestamp at all.
//!
//! Timestamps are UTC, truncated to seconds, and render as
//! `YYYY-MM-DDTHH:MM:SSZ`.

use chrono::{DateTime, Timelike, Utc};
use serde::{Serialize, Serializer};

/// A UTC-only timestamp, truncated to seconds precision. Serializes as its
/// ISO8601 rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncates_subseconds() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let truncated = truncate_to_seconds(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(truncated, dt);
    }

    #[test]
    fn test_serializes_as_iso8601() {
        let ts = Timestamp(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2026-01-15T12:00:00Z\"");
        let now = serde_json::to_string(&Timestamp::now()).unwrap();
        assert_eq!(now.len(), 22, "{now}");
    }

    #[test]
    fn test_display_matches_iso8601() {
        let ts = Timestamp(Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap());
        assert_eq!(format!("{ts}"), "2026-06-30T23:59:59Z");
        assert_eq!(ts.to_iso8601().len(), 20);
    }
}
