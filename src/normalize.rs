//! Pure field normalization: dates to ISO-8601 instants, times to 24-hour
//! `HH:MM`, plus the email predicate and required-field trimming.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

/// `hours:minutes` with an optional AM/PM marker, e.g. `9:30 AM` or `21:30`.
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?:\s*(AM|PM|am|pm))?$").unwrap());

/// Something before `@`, something after, and at least one dot in the domain,
/// with no whitespace anywhere.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Date-only and date-time layouts tried after RFC 3339, covering bare
/// `YYYY-MM-DD` and natural-language forms such as "June 15, 2024".
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a free-form date string and return the canonical ISO-8601 instant,
/// e.g. `2024-06-15` becomes `2024-06-15T00:00:00.000Z`.
pub fn normalize_date(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let instant = parse_instant(trimmed).ok_or(AppError::InvalidDateFormat)?;
    Ok(to_iso_millis(&instant))
}

/// Format a UTC instant the way normalized dates and timestamps are stored.
pub fn to_iso_millis(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

/// Normalize a time string to 24-hour `HH:MM`.
///
/// Accepts one or two hour digits, exactly two minute digits, and an
/// optional AM/PM marker. A pattern mismatch is [`AppError::InvalidTimeFormat`];
/// out-of-range components after meridiem conversion are
/// [`AppError::InvalidTimeValues`].
pub fn normalize_time(raw: &str) -> Result<String, AppError> {
    let caps = TIME_RE
        .captures(raw.trim())
        .ok_or(AppError::InvalidTimeFormat)?;
    let mut hours: u32 = caps[1].parse().map_err(|_| AppError::InvalidTimeFormat)?;
    let minutes: u32 = caps[2].parse().map_err(|_| AppError::InvalidTimeFormat)?;
    if let Some(marker) = caps.get(3) {
        let is_pm = marker.as_str().eq_ignore_ascii_case("pm");
        if is_pm && hours < 12 {
            hours += 12;
        }
        if !is_pm && hours == 12 {
            hours = 0;
        }
    }
    if hours > 23 || minutes > 59 {
        return Err(AppError::InvalidTimeValues);
    }
    Ok(format!("{hours:02}:{minutes:02}"))
}

/// Email predicate applied after trimming. Consecutive dots are rejected
/// even though the pattern alone would let them through.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s) && !s.contains("..")
}

/// Trim a required field, failing if nothing is left.
pub fn required(name: &'static str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField(name));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_date_becomes_midnight_utc() {
        assert_eq!(
            normalize_date("2024-06-15").unwrap(),
            "2024-06-15T00:00:00.000Z"
        );
    }

    #[test]
    fn full_instants_and_natural_language_parse() {
        assert_eq!(
            normalize_date("2024-06-15T09:30:00.000Z").unwrap(),
            "2024-06-15T09:30:00.000Z"
        );
        assert_eq!(
            normalize_date("June 15, 2024").unwrap(),
            "2024-06-15T00:00:00.000Z"
        );
        assert_eq!(
            normalize_date("2024-06-15T09:30").unwrap(),
            "2024-06-15T09:30:00.000Z"
        );
        assert_eq!(
            normalize_date("2024-06-15 09:30").unwrap(),
            "2024-06-15T09:30:00.000Z"
        );
        assert_eq!(
            normalize_date("Jun 15, 2024").unwrap(),
            "2024-06-15T00:00:00.000Z"
        );
    }

    #[test]
    fn offset_instants_canonicalize_to_utc() {
        assert_eq!(
            normalize_date("2024-06-15T02:00:00+02:00").unwrap(),
            "2024-06-15T00:00:00.000Z"
        );
    }

    #[test]
    fn garbage_dates_fail() {
        assert!(matches!(
            normalize_date("not-a-valid-date"),
            Err(AppError::InvalidDateFormat)
        ));
        assert!(matches!(normalize_date(""), Err(AppError::InvalidDateFormat)));
    }

    #[test]
    fn meridiem_conversion() {
        assert_eq!(normalize_time("9:30 AM").unwrap(), "09:30");
        assert_eq!(normalize_time("12:00 AM").unwrap(), "00:00");
        assert_eq!(normalize_time("12:00 PM").unwrap(), "12:00");
        assert_eq!(normalize_time("3:45 PM").unwrap(), "15:45");
        assert_eq!(normalize_time("3:45pm").unwrap(), "15:45");
    }

    #[test]
    fn twenty_four_hour_passthrough() {
        assert_eq!(normalize_time("21:30").unwrap(), "21:30");
        assert_eq!(normalize_time("0:05").unwrap(), "00:05");
        assert_eq!(normalize_time("  14:00  ").unwrap(), "14:00");
    }

    #[test]
    fn out_of_range_components_are_value_errors() {
        assert!(matches!(
            normalize_time("25:00"),
            Err(AppError::InvalidTimeValues)
        ));
        assert!(matches!(
            normalize_time("10:75"),
            Err(AppError::InvalidTimeValues)
        ));
    }

    #[test]
    fn pattern_mismatch_is_format_error() {
        assert!(matches!(
            normalize_time("14"),
            Err(AppError::InvalidTimeFormat)
        ));
        assert!(matches!(
            normalize_time("9:5"),
            Err(AppError::InvalidTimeFormat)
        ));
        assert!(matches!(
            normalize_time("noonish"),
            Err(AppError::InvalidTimeFormat)
        ));
    }

    #[test]
    fn email_predicate() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("test.user@example.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        assert!(is_valid_email("user123@test-domain.com"));

        assert!(!is_valid_email("notanemail"));
        assert!(!is_valid_email("missing@domain"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user..name@example.com"));
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("title", "  Rust Meetup  ").unwrap(), "Rust Meetup");
        assert!(matches!(
            required("title", "   "),
            Err(AppError::MissingField("title"))
        ));
    }
}
