//! Textual timestamp format shared by every row in the store.
//!
//! Timestamps are local wall-clock times written in a sortable form so the
//! store can compare them as plain text.

use chrono::{Local, NaiveDateTime};

/// Format written for every system-set timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Formats accepted when reading, newest first. The last one is the
/// day-first layout older desktop installs wrote.
const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
];

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_written_format_parses_back() {
        let written = format_timestamp(noon());
        assert_eq!(written, "2024-01-01 12:00:00.000");
        assert_eq!(parse_timestamp(&written), Some(noon()));
    }

    #[test]
    fn test_accepts_common_layouts() {
        assert_eq!(parse_timestamp("2024-01-01 12:00:00"), Some(noon()));
        assert_eq!(parse_timestamp("2024-01-01T12:00:00"), Some(noon()));
        assert_eq!(parse_timestamp("2024-01-01 12:00"), Some(noon()));
        assert_eq!(parse_timestamp("01/01/2024 12:00"), Some(noon()));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("tomorrow-ish"), None);
        assert_eq!(parse_timestamp("2024-13-45 99:99"), None);
    }

    #[test]
    fn test_written_format_sorts_as_text() {
        let earlier = format_timestamp(noon());
        let later = format_timestamp(noon() + chrono::Duration::milliseconds(5));
        assert!(earlier < later);
    }
}
