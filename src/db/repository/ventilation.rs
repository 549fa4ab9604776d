use std::collections::BTreeMap;

use rusqlite::{params_from_iter, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{VentilationPeriod, VentilationRecord};

use super::admission::parse_uuid;
use super::{parse_instant, sql_placeholders};

/// Assembles one ventilation record per admission from airway events and
/// ventilation sub-periods. Instant lists come out sorted ascending; the
/// result is ordered by admission id for deterministic documents.
pub fn fetch_ventilation_records(
    conn: &Connection,
    admission_ids: &[Uuid],
) -> Result<Vec<VentilationRecord>, DatabaseError> {
    if admission_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut records: BTreeMap<Uuid, VentilationRecord> = BTreeMap::new();

    let bindings: Vec<String> = admission_ids.iter().map(Uuid::to_string).collect();

    let sql = format!(
        "SELECT admission_id, event_type, occurred_at FROM airway_events
         WHERE admission_id IN ({}) ORDER BY occurred_at",
        sql_placeholders(admission_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let events = stmt.query_map(params_from_iter(bindings.clone()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    for event in events {
        let (admission_id, event_type, occurred_at) = event?;
        let Some(admission_id) = parse_uuid(&admission_id, "airway_events.admission_id") else {
            continue;
        };
        let Some(instant) = parse_instant(&occurred_at, "airway_events.occurred_at") else {
            continue;
        };
        let record = entry_for(&mut records, admission_id);
        match event_type.as_str() {
            "intubation" => record.intubations.push(instant),
            "extubation" => record.extubations.push(instant),
            other => {
                tracing::warn!("Skipping unknown airway event type {other:?} for {admission_id}");
            }
        }
    }

    let sql = format!(
        "SELECT admission_id, start_at, end_at, end_source FROM ventilation_periods
         WHERE admission_id IN ({}) ORDER BY start_at",
        sql_placeholders(admission_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let periods = stmt.query_map(params_from_iter(bindings), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    for period in periods {
        let (admission_id, start_at, end_at, end_source) = period?;
        let Some(admission_id) = parse_uuid(&admission_id, "ventilation_periods.admission_id")
        else {
            continue;
        };
        let Some(start) = parse_instant(&start_at, "ventilation_periods.start_at") else {
            continue;
        };
        let end = match end_at {
            Some(raw) => match parse_instant(&raw, "ventilation_periods.end_at") {
                Some(end) => Some(end),
                None => continue,
            },
            None => None,
        };
        entry_for(&mut records, admission_id)
            .periods
            .push(VentilationPeriod { start, end, end_source });
    }

    Ok(records.into_values().collect())
}

fn entry_for(
    records: &mut BTreeMap<Uuid, VentilationRecord>,
    admission_id: Uuid,
) -> &mut VentilationRecord {
    records.entry(admission_id).or_insert_with(|| VentilationRecord {
        admission_id,
        intubations: Vec::new(),
        extubations: Vec::new(),
        periods: Vec::new(),
    })
}
