//! Date handling at the persistence boundary and calendar arithmetic.
//!
//! Stored dates arrive as strings in a handful of legacy formats; they are
//! parsed here, once, when a store implementation materializes records.
//! Business logic only ever sees chrono values. A row whose date fails
//! every format is the store's cue to skip it and log, per the degrade-
//! gracefully policy for dashboard reads.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a stored calendar date. Accepts ISO dates, slashed variants, and
/// datetime strings (the date part wins).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Datetime forms first: "2025-01-31T08:00:00" and friends.
    if trimmed.contains('T') || trimmed.contains(' ') {
        if let Some(dt) = parse_datetime_utc(trimmed) {
            return Some(dt.date_naive());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

/// Parse a stored timestamp to UTC. Naive timestamps are assumed UTC.
pub fn parse_datetime_utc(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    // Bare date: midnight UTC.
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Today's calendar date in a campus's timezone.
pub fn local_today(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Leap-year rule: divisible by 4 and (not divisible by 100 or divisible
/// by 400).
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in a calendar month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// Build a date, clamping the day to the last valid day of the month
/// (Jan 31 -> Feb 28/29, day 31 -> 30 in short months). Out-of-range
/// months clamp into 1..=12 as well.
pub fn clamp_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let month = month.clamp(1, 12);
    let day = day.min(days_in_month(year, month)).max(1);
    // Infallible after clamping both components.
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 1, 1).expect("jan 1 is valid"))
}

/// A member's calendar birthday with the year substituted. Feb 29 births
/// clamp to Feb 28 in non-leap years.
pub fn birthday_in_year(birth_date: NaiveDate, year: i32) -> NaiveDate {
    clamp_day(year, birth_date.month(), birth_date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_date_formats() {
        for value in ["2025-01-31", "2025/01/31", "01/31/2025", "31.01.2025"] {
            assert_eq!(
                parse_date(value),
                NaiveDate::from_ymd_opt(2025, 1, 31),
                "failed for {value}"
            );
        }
    }

    #[test]
    fn parses_datetime_as_date() {
        assert_eq!(
            parse_date("2025-06-01T14:30:00Z"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(
            parse_date("2025-06-01 14:30:00"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn garbage_dates_are_none() {
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("2025-13-40").is_none());
    }

    #[test]
    fn naive_timestamps_assume_utc() {
        let dt = parse_datetime_utc("2025-06-01T09:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T09:00:00+00:00");
    }

    #[test]
    fn leap_year_rule() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2025));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn clamps_to_month_end() {
        assert_eq!(
            clamp_day(2025, 2, 31),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            clamp_day(2024, 2, 31),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            clamp_day(2025, 4, 31),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()
        );
    }

    #[test]
    fn feb_29_birthday_clamps_in_common_years() {
        let birth = NaiveDate::from_ymd_opt(1996, 2, 29).unwrap();
        assert_eq!(
            birthday_in_year(birth, 2025),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            birthday_in_year(birth, 2024),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
