//! Repository layer — typed read fetchers over the clinical record store.
//!
//! Every function takes an explicit `&Connection` and returns fully typed
//! snapshot records. Instants are stored as RFC 3339 text; rows or periods
//! whose instants do not carry an explicit offset are skipped with a warning
//! instead of aborting the computation.

mod admission;
mod antibiotic;
mod device_day;
mod lab;
mod report_cache;
mod sector_stay;
mod ventilation;

pub use admission::*;
pub use antibiotic::*;
pub use device_day::*;
pub use lab::*;
pub use report_cache::*;
pub use sector_stay::*;
pub use ventilation::*;

use chrono::{DateTime, SecondsFormat, Utc};

/// Parses a stored RFC 3339 instant, normalized to UTC. A value lacking an
/// explicit offset fails to parse and is excluded, never assumed local.
pub(crate) fn parse_instant(raw: &str, context: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(err) => {
            tracing::warn!("Skipping malformed instant in {context}: {raw:?} ({err})");
            None
        }
    }
}

/// Canonical stored form of an instant: UTC, whole seconds, `Z` suffix.
/// Keeps lexicographic ordering consistent with chronological ordering.
pub(crate) fn to_sql_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `?,?,...,?` for dynamic `IN (...)` lists; `count` must be > 0.
pub(crate) fn sql_placeholders(count: usize) -> String {
    let mut vars = "?,".repeat(count);
    vars.pop();
    vars
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parse_instant_requires_explicit_offset() {
        assert!(parse_instant("2026-01-15T10:00:00Z", "test").is_some());
        assert!(parse_instant("2026-01-15T10:00:00+02:00", "test").is_some());
        // No offset -> excluded, never assumed local
        assert!(parse_instant("2026-01-15T10:00:00", "test").is_none());
        assert!(parse_instant("not-a-date", "test").is_none());
    }

    #[test]
    fn parse_instant_normalizes_to_utc() {
        let parsed = parse_instant("2026-01-15T12:00:00+02:00", "test").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn sql_instant_round_trips() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap();
        let stored = to_sql_instant(instant);
        assert_eq!(stored, "2026-01-15T10:30:00Z");
        assert_eq!(parse_instant(&stored, "test"), Some(instant));
    }

    #[test]
    fn placeholders_are_comma_separated() {
        assert_eq!(sql_placeholders(1), "?");
        assert_eq!(sql_placeholders(3), "?,?,?");
    }
}
