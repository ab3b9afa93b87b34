//! TLE epoch resolution
//!
//! A TLE stamps its elements with a two-digit year and a fractional
//! day-of-year; both resolve to an absolute UTC instant here.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Resolve a two-digit TLE year against the fixed NORAD pivot
///
/// Years below 57 belong to 2000-2056, the rest to 1957-1999. The pivot
/// is part of the format, not relative to the current date.
pub fn full_year(two_digit: i64) -> i32 {
    if two_digit < 57 {
        2000 + two_digit as i32
    } else {
        1900 + two_digit as i32
    }
}

/// Absolute UTC timestamp for a TLE epoch
///
/// Day 1.0 is January 1 at midnight; the fractional part carries through
/// at microsecond precision. Total for any input: out-of-range day counts
/// are clamped into a single year rather than panicking.
pub fn epoch_datetime(two_digit_year: i64, day_of_year: f64) -> DateTime<Utc> {
    let year = full_year(two_digit_year);
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default();

    let day = if day_of_year.is_finite() {
        day_of_year.clamp(0.0, 367.0)
    } else {
        0.0
    };
    let whole_days = day.floor() as i64 - 1;
    let micros = ((day - day.floor()) * 86_400_000_000.0) as i64;

    jan1 + TimeDelta::days(whole_days) + TimeDelta::microseconds(micros)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_pivot_is_fixed_at_57() {
        assert_eq!(full_year(0), 2000);
        assert_eq!(full_year(25), 2025);
        assert_eq!(full_year(56), 2056);
        assert_eq!(full_year(57), 1957);
        assert_eq!(full_year(99), 1999);
    }

    #[test]
    fn test_day_one_is_january_first() {
        let epoch = epoch_datetime(25, 1.0);
        assert_eq!(
            epoch.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2025-01-01 00:00:00"
        );
    }

    #[test]
    fn test_fractional_day_resolves_to_seconds() {
        // Day 308 of 2025 is November 4; 0.55131963 of a day is 47634 s
        let epoch = epoch_datetime(25, 308.55131963);
        assert_eq!(
            epoch.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2025-11-04 13:13:54"
        );
    }

    #[test]
    fn test_half_day() {
        let epoch = epoch_datetime(57, 32.5);
        assert_eq!(
            epoch.format("%Y-%m-%d %H:%M:%S").to_string(),
            "1957-02-01 12:00:00"
        );
    }

    #[test]
    fn test_hostile_day_counts_do_not_panic() {
        let _ = epoch_datetime(25, f64::NAN);
        let _ = epoch_datetime(25, 1.0e300);
        let _ = epoch_datetime(25, -5.0);
    }
}
