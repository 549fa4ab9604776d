use std::collections::BTreeMap;

use rusqlite::{params_from_iter, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{AntibioticUsage, DosingPeriod};

use super::admission::parse_uuid;
use super::{parse_instant, sql_placeholders};

/// Antibiotic usages with their closed dosing periods, for the given
/// admissions. Usages whose periods are all malformed still appear, with an
/// empty period list; the rollup then ignores them.
pub fn fetch_antibiotic_usage(
    conn: &Connection,
    admission_ids: &[Uuid],
) -> Result<Vec<AntibioticUsage>, DatabaseError> {
    if admission_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, admission_id, antibiotic FROM antibiotic_usages
         WHERE admission_id IN ({})",
        sql_placeholders(admission_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(admission_ids.iter().map(Uuid::to_string)),
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    )?;

    let mut usages: BTreeMap<Uuid, AntibioticUsage> = BTreeMap::new();
    for row in rows {
        let (id, admission_id, antibiotic) = row?;
        let Some(id) = parse_uuid(&id, "antibiotic_usages.id") else { continue };
        let Some(admission_id) = parse_uuid(&admission_id, "antibiotic_usages.admission_id") else {
            continue;
        };
        usages.insert(id, AntibioticUsage { id, admission_id, antibiotic, periods: Vec::new() });
    }

    if usages.is_empty() {
        return Ok(Vec::new());
    }

    let usage_ids: Vec<String> = usages.keys().map(Uuid::to_string).collect();
    let sql = format!(
        "SELECT usage_id, start_at, end_at FROM antibiotic_periods
         WHERE usage_id IN ({}) ORDER BY start_at",
        sql_placeholders(usage_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(usage_ids), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    for row in rows {
        let (usage_id, start_at, end_at) = row?;
        let Some(usage_id) = parse_uuid(&usage_id, "antibiotic_periods.usage_id") else {
            continue;
        };
        let Some(start) = parse_instant(&start_at, "antibiotic_periods.start_at") else {
            continue;
        };
        let Some(end) = parse_instant(&end_at, "antibiotic_periods.end_at") else { continue };
        if let Some(usage) = usages.get_mut(&usage_id) {
            usage.periods.push(DosingPeriod { start, end });
        }
    }

    Ok(usages.into_values().collect())
}
