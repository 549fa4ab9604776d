use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::LabResult;

use super::admission::parse_uuid;
use super::parse_instant;

/// All lab results of one admission, ordered by test then collection
/// instant ascending (series order).
pub fn fetch_lab_results(
    conn: &Connection,
    admission_id: &Uuid,
) -> Result<Vec<LabResult>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, admission_id, test_name, value, unit, measured_at FROM lab_results
         WHERE admission_id = ?1 ORDER BY test_name, measured_at",
    )?;
    let rows = stmt.query_map(params![admission_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<f64>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, admission_id, test_name, value, unit, measured_at) = row?;
        let Some(id) = parse_uuid(&id, "lab_results.id") else { continue };
        let Some(admission_id) = parse_uuid(&admission_id, "lab_results.admission_id") else {
            continue;
        };
        let Some(measured_at) = parse_instant(&measured_at, "lab_results.measured_at") else {
            continue;
        };
        results.push(LabResult { id, admission_id, test_name, value, unit, measured_at });
    }
    Ok(results)
}
