//! Interval overlap math — foundation for every duration-based KPI.
//!
//! All instants are `DateTime<Utc>`; normalization to a single reference
//! timezone happens at the storage boundary, so values reaching these
//! functions are already comparable. Open-ended intervals (`end == None`)
//! extend to a caller-supplied `now`.

use chrono::{DateTime, Utc};

use crate::models::QueryWindow;

pub const SECONDS_PER_HOUR: f64 = 3_600.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Exact overlap, in fractional seconds, between the interval
/// `[start, end-or-now)` and the half-open query window.
/// Degenerate or disjoint inputs yield 0.0.
pub fn overlap_seconds(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    window: &QueryWindow,
    now: DateTime<Utc>,
) -> f64 {
    let effective_end = end.unwrap_or(now);
    if effective_end <= start {
        return 0.0;
    }

    let lo = start.max(window.start);
    let hi = effective_end.min(window.end);
    if hi <= lo {
        return 0.0;
    }

    duration_seconds(lo, hi)
}

/// Signed difference `b - a` in fractional seconds.
fn duration_seconds(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    let delta = b.signed_duration_since(a);
    delta.num_milliseconds() as f64 / 1_000.0
}

/// Difference `b - a` in fractional hours.
pub fn hours_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    duration_seconds(a, b) / SECONDS_PER_HOUR
}

/// Difference `b - a` in fractional days.
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    duration_seconds(a, b) / SECONDS_PER_DAY
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn partial_overlap_is_clipped_on_both_sides() {
        // [Jan 1, Jan 10) vs window [Jan 5, Jan 15) -> 4 days
        let window = QueryWindow::new(utc(2026, 1, 5), utc(2026, 1, 15));
        let secs = overlap_seconds(utc(2026, 1, 1), Some(utc(2026, 1, 10)), &window, utc(2026, 2, 1));
        assert_eq!(secs, 4.0 * SECONDS_PER_DAY);
    }

    #[test]
    fn open_interval_is_clipped_by_window_end_not_now() {
        // Open interval from Jan 1 with now = Jan 20, window [Jan 1, Jan 2)
        let window = QueryWindow::new(utc(2026, 1, 1), utc(2026, 1, 2));
        let secs = overlap_seconds(utc(2026, 1, 1), None, &window, utc(2026, 1, 20));
        assert_eq!(secs, SECONDS_PER_DAY);
    }

    #[test]
    fn open_interval_clipped_by_now_when_now_inside_window() {
        let window = QueryWindow::new(utc(2026, 1, 1), utc(2026, 1, 10));
        let secs = overlap_seconds(utc(2026, 1, 1), None, &window, utc(2026, 1, 3));
        assert_eq!(secs, 2.0 * SECONDS_PER_DAY);
    }

    #[test]
    fn disjoint_intervals_overlap_zero() {
        let window = QueryWindow::new(utc(2026, 1, 10), utc(2026, 1, 20));
        let secs = overlap_seconds(utc(2026, 1, 1), Some(utc(2026, 1, 5)), &window, utc(2026, 2, 1));
        assert_eq!(secs, 0.0);
    }

    #[test]
    fn degenerate_interval_overlap_zero() {
        let window = QueryWindow::new(utc(2026, 1, 1), utc(2026, 1, 10));
        // end before start
        let secs = overlap_seconds(utc(2026, 1, 5), Some(utc(2026, 1, 4)), &window, utc(2026, 2, 1));
        assert_eq!(secs, 0.0);
        // zero-length window
        let empty = QueryWindow::new(utc(2026, 1, 5), utc(2026, 1, 5));
        assert_eq!(overlap_seconds(utc(2026, 1, 1), None, &empty, utc(2026, 2, 1)), 0.0);
    }

    #[test]
    fn hour_and_day_conversions() {
        assert_eq!(hours_between(utc(2026, 1, 1), utc(2026, 1, 3)), 48.0);
        assert_eq!(days_between(utc(2026, 1, 1), utc(2026, 1, 3)), 2.0);
        assert_eq!(seconds_to_hours(7_200.0), 2.0);
        assert_eq!(seconds_to_days(43_200.0), 0.5);
    }
}
