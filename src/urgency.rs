use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orders::timestamps::parse_timestamp;

/// Slack above which an order is not urgent, in minutes
const LOW_THRESHOLD_MINUTES: i64 = 60;
/// Slack above which an order is only moderately urgent, in minutes
const MEDIUM_THRESHOLD_MINUTES: i64 = 30;

/// Urgency tier derived from the time left until scheduled completion.
///
/// Depends on the current time, so it is recomputed on every read and
/// never stored or cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// More than an hour left
    Low,
    /// Between half an hour and an hour left
    Medium,
    /// Half an hour or less left, or already overdue
    High,
    /// No estimate, or the stored estimate is not a timestamp
    Unknown,
}

impl Urgency {
    /// Classify the slack between `scheduled` and `now`
    pub fn between(scheduled: NaiveDateTime, now: NaiveDateTime) -> Self {
        // full precision; a fraction of a second past a threshold counts
        let remaining = scheduled - now;
        if remaining > TimeDelta::minutes(LOW_THRESHOLD_MINUTES) {
            Urgency::Low
        } else if remaining > TimeDelta::minutes(MEDIUM_THRESHOLD_MINUTES) {
            Urgency::Medium
        } else {
            Urgency::High
        }
    }

    /// Board colour for the tier
    pub fn color_hex(self) -> &'static str {
        match self {
            Urgency::Low => "#28a745",
            Urgency::Medium => "#fd7e14",
            Urgency::High => "#dc3545",
            Urgency::Unknown => "#444444",
        }
    }
}

/// Urgency of a stored scheduled-completion value at `now`
pub fn urgency(scheduled_completion: Option<&str>, now: NaiveDateTime) -> Urgency {
    match scheduled_completion.and_then(parse_timestamp) {
        Some(scheduled) => Urgency::between(scheduled, now),
        None => Urgency::Unknown,
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Urgency::Low => "LOW",
            Urgency::Medium => "MEDIUM",
            Urgency::High => "HIGH",
            Urgency::Unknown => "UNKNOWN",
        };
        f.pad(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_urgency_tiers() {
        assert_eq!(urgency(Some("2024-01-01 13:05"), now()), Urgency::Low);
        assert_eq!(urgency(Some("2024-01-01 12:45"), now()), Urgency::Medium);
        assert_eq!(urgency(Some("2024-01-01 12:10"), now()), Urgency::High);
        assert_eq!(urgency(Some("2024-01-01 11:50"), now()), Urgency::High);
    }

    #[test]
    fn test_missing_or_unparseable_is_unknown() {
        assert_eq!(urgency(None, now()), Urgency::Unknown);
        assert_eq!(urgency(Some(""), now()), Urgency::Unknown);
        assert_eq!(urgency(Some("after lunch"), now()), Urgency::Unknown);
    }

    #[test]
    fn test_boundaries() {
        // exactly 60 minutes is not "more than an hour"
        assert_eq!(urgency(Some("2024-01-01 13:00"), now()), Urgency::Medium);
        assert_eq!(urgency(Some("2024-01-01 13:00:01"), now()), Urgency::Low);
        // exactly 30 minutes is already high
        assert_eq!(urgency(Some("2024-01-01 12:30"), now()), Urgency::High);
        assert_eq!(urgency(Some("2024-01-01 12:30:01"), now()), Urgency::Medium);
    }

    #[test]
    fn test_sub_second_slack_crosses_thresholds() {
        assert_eq!(urgency(Some("2024-01-01 13:00:00.500"), now()), Urgency::Low);
        assert_eq!(urgency(Some("2024-01-01 12:30:00.500"), now()), Urgency::Medium);
        assert_eq!(urgency(Some("2024-01-01 12:59:59.500"), now()), Urgency::Medium);
        assert_eq!(urgency(Some("2024-01-01 12:29:59.500"), now()), Urgency::High);

        let just_before_noon = now() - TimeDelta::milliseconds(250);
        assert_eq!(
            Urgency::between(now() + TimeDelta::minutes(60), just_before_noon),
            Urgency::Low
        );
    }

    #[test]
    fn test_legacy_day_first_layout() {
        assert_eq!(urgency(Some("01/01/2024 14:00"), now()), Urgency::Low);
    }

    #[test]
    fn test_display_and_colors() {
        assert_eq!(Urgency::Low.to_string(), "LOW");
        assert_eq!(Urgency::Unknown.to_string(), "UNKNOWN");
        assert_eq!(Urgency::Low.color_hex(), "#28a745");
        assert_eq!(Urgency::High.color_hex(), "#dc3545");
    }
}
