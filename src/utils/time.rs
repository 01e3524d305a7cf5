//! Timestamp and duration formatting.
//!
//! Dates are exchanged in one pattern, `dd MMM yyyy HH:mm zone`, for both
//! display and operator input. The zone may be a common abbreviation
//! (`UTC`, `GMT`, `EDT`, `PST`, ...) or a numeric offset (`+0200`, `-04:00`).

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::config::DATE_FORMAT;

const DATE_TIME_PART: &str = "%d %b %Y %H:%M";

/// Zone abbreviations accepted on input, with their offset from UTC in hours.
const ZONE_ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("BST", 1),
    ("CET", 1),
    ("CEST", 2),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
];

/// Formats a timestamp as e.g. `05 Aug 2006 22:44 UTC`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(DATE_FORMAT).to_string()
}

/// Parses `dd MMM yyyy HH:mm zone` into a UTC timestamp.
///
/// Returns `None` when the date part does not match or the zone is unknown.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    let (date_part, zone) = input.rsplit_once(char::is_whitespace)?;
    let naive = NaiveDateTime::parse_from_str(date_part.trim(), DATE_TIME_PART).ok()?;
    let offset = parse_zone(zone)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let upper = zone.to_ascii_uppercase();
    if let Some((_, hours)) = ZONE_ABBREVIATIONS.iter().find(|(name, _)| *name == upper) {
        return FixedOffset::east_opt(hours * 3600);
    }

    // Numeric offsets: +0200, -0400, +02:00
    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Renders a duration in seconds as `N days N hours N minutes`.
///
/// Days and hours are omitted when zero; minutes are always shown.
pub fn hours_and_minutes(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{} day{}", days, if days > 1 { "s" } else { "" }));
    }
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, if hours > 1 { "s" } else { "" }));
    }
    parts.push(format!(
        "{} minute{}",
        minutes,
        if minutes != 1 { "s" } else { "" }
    ));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_with_abbreviation() {
        let ts = parse_timestamp("5 Aug 2006 18:44 EDT").expect("should parse");
        assert_eq!(ts.year(), 2006);
        assert_eq!(ts.month(), 8);
        assert_eq!(ts.day(), 5);
        // EDT is UTC-4
        assert_eq!(ts.hour(), 22);
        assert_eq!(ts.minute(), 44);
    }

    #[test]
    fn test_parse_with_numeric_offset() {
        let a = parse_timestamp("05 Aug 2006 18:44 -0400").expect("should parse");
        let b = parse_timestamp("05 Aug 2006 18:44 -04:00").expect("should parse");
        let c = parse_timestamp("05 Aug 2006 22:44 UTC").expect("should parse");
        assert_eq!(a, c);
        assert_eq!(b, c);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("05 Aug 2006 18:44 XYZ").is_none());
        assert!(parse_timestamp("05 Aug 2006 18:44").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        let ts = parse_timestamp("31 Dec 2024 23:59 GMT").expect("should parse");
        assert_eq!(format_timestamp(ts), "31 Dec 2024 23:59 UTC");
        assert_eq!(parse_timestamp(&format_timestamp(ts)), Some(ts));
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(hours_and_minutes(0), "0 minutes");
        assert_eq!(hours_and_minutes(60), "1 minute");
        assert_eq!(hours_and_minutes(3_660), "1 hour 1 minute");
        assert_eq!(hours_and_minutes(2 * 86_400 + 3 * 3_600 + 5 * 60), "2 days 3 hours 5 minutes");
        assert_eq!(hours_and_minutes(-30), "0 minutes");
    }
}
