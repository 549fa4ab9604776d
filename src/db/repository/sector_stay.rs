use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{QueryWindow, SectorStay};

use super::admission::parse_uuid;
use super::{parse_instant, sql_placeholders, to_sql_instant};

/// Stays in the target sector overlapping the window: started before the
/// window ends, not finished before it starts (or still ongoing).
pub fn fetch_stays_overlapping(
    conn: &Connection,
    sector_id: &str,
    window: &QueryWindow,
) -> Result<Vec<SectorStay>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, admission_id, sector_id, start_at, end_at FROM sector_stays
         WHERE sector_id = ?1 AND start_at < ?2 AND (end_at IS NULL OR end_at >= ?3)",
    )?;
    let rows = stmt.query_map(
        params![sector_id, to_sql_instant(window.end), to_sql_instant(window.start)],
        stay_row,
    )?;
    collect_stays(rows)
}

/// Stays in the target sector for the given admissions, unbounded in time.
/// Existence test: "ever passed through the sector".
pub fn fetch_stays_for_admissions(
    conn: &Connection,
    sector_id: &str,
    admission_ids: &[Uuid],
) -> Result<Vec<SectorStay>, DatabaseError> {
    if admission_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, admission_id, sector_id, start_at, end_at FROM sector_stays
         WHERE sector_id = ?1 AND admission_id IN ({})",
        sql_placeholders(admission_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;

    let mut bindings: Vec<String> = Vec::with_capacity(admission_ids.len() + 1);
    bindings.push(sector_id.to_string());
    bindings.extend(admission_ids.iter().map(Uuid::to_string));

    let rows = stmt.query_map(params_from_iter(bindings), stay_row)?;
    collect_stays(rows)
}

type StayRow = (String, String, String, String, Option<String>);

fn stay_row(row: &rusqlite::Row<'_>) -> Result<StayRow, rusqlite::Error> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn collect_stays(
    rows: impl Iterator<Item = Result<StayRow, rusqlite::Error>>,
) -> Result<Vec<SectorStay>, DatabaseError> {
    let mut stays = Vec::new();
    for row in rows {
        let (id, admission_id, sector_id, start_at, end_at) = row?;
        let Some(id) = parse_uuid(&id, "sector_stays.id") else { continue };
        let Some(admission_id) = parse_uuid(&admission_id, "sector_stays.admission_id") else {
            continue;
        };
        let Some(start) = parse_instant(&start_at, "sector_stays.start_at") else { continue };
        let end = match end_at {
            Some(raw) => match parse_instant(&raw, "sector_stays.end_at") {
                Some(end) => Some(end),
                None => continue,
            },
            None => None,
        };
        stays.push(SectorStay { id, admission_id, sector_id, start, end });
    }
    Ok(stays)
}
