use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::QueryWindow;
use crate::report::UnitReport;

use super::to_sql_instant;

/// Idempotent upsert of a computed unit document, keyed by
/// `(sector_id, window_start, window_end)`. Each upsert fully replaces the
/// prior value, so there is no read-modify-write race.
pub fn upsert_unit_report(
    conn: &Connection,
    report: &UnitReport,
    computed_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let document = serde_json::to_string(report)?;
    conn.execute(
        "INSERT INTO unit_report_cache (sector_id, window_start, window_end, document, computed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (sector_id, window_start, window_end)
         DO UPDATE SET document = excluded.document, computed_at = excluded.computed_at",
        params![
            report.sector_id,
            to_sql_instant(report.period.start),
            to_sql_instant(report.period.end),
            document,
            to_sql_instant(computed_at),
        ],
    )?;
    Ok(())
}

/// Reads back a previously persisted unit document, if any.
pub fn get_cached_unit_report(
    conn: &Connection,
    sector_id: &str,
    window: &QueryWindow,
) -> Result<Option<UnitReport>, DatabaseError> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM unit_report_cache
             WHERE sector_id = ?1 AND window_start = ?2 AND window_end = ?3",
            params![sector_id, to_sql_instant(window.start), to_sql_instant(window.end)],
            |row| row.get(0),
        )
        .optional()?;

    match document {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}
