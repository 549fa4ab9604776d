use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DeviceDayAggregate, DeviceDayRecord, QueryWindow};

use super::admission::parse_uuid;

/// Device-day rows for one sector scoped to `[window.start, window.end)` at
/// day granularity, reduced to the aggregate the prevalence ratios consume.
pub fn fetch_device_day_aggregate(
    conn: &Connection,
    sector_id: &str,
    window: &QueryWindow,
) -> Result<DeviceDayAggregate, DatabaseError> {
    let rows = fetch_rows(
        conn,
        "SELECT admission_id, sector_id, day, catheter, urinary_catheter, arterial_line, ventilated
         FROM device_days WHERE sector_id = ?1 AND day >= ?2 AND day < ?3",
        params![
            sector_id,
            window.start.date_naive().to_string(),
            window.end.date_naive().to_string()
        ],
    )?;
    Ok(DeviceDayAggregate::from_rows(&rows))
}

/// All device-day rows of one admission, for the patient-level report.
pub fn fetch_device_days_for_admission(
    conn: &Connection,
    admission_id: &Uuid,
) -> Result<Vec<DeviceDayRecord>, DatabaseError> {
    fetch_rows(
        conn,
        "SELECT admission_id, sector_id, day, catheter, urinary_catheter, arterial_line, ventilated
         FROM device_days WHERE admission_id = ?1 ORDER BY day",
        params![admission_id.to_string()],
    )
}

fn fetch_rows(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<DeviceDayRecord>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, i64>(6)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (admission_id, sector_id, day, catheter, urinary_catheter, arterial_line, ventilated) =
            row?;
        let Some(admission_id) = parse_uuid(&admission_id, "device_days.admission_id") else {
            continue;
        };
        let Ok(day) = NaiveDate::parse_from_str(&day, "%Y-%m-%d") else {
            tracing::warn!("Skipping malformed day in device_days: {day:?}");
            continue;
        };
        records.push(DeviceDayRecord {
            admission_id,
            sector_id,
            day,
            catheter: catheter != 0,
            urinary_catheter: urinary_catheter != 0,
            arterial_line: arterial_line != 0,
            ventilated: ventilated != 0,
        });
    }
    Ok(records)
}
