use std::str::FromStr;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Admission, AdmissionOutcome, QueryWindow};

use super::{parse_instant, sql_placeholders, to_sql_instant};

const ADMISSION_COLUMNS: &str =
    "id, patient_id, admitted_at, discharged_at, outcome, destination_label";

/// Admissions whose discharge instant falls inside `[window.start,
/// window.end)`. The cohort resolver re-checks the bound on typed instants.
pub fn fetch_admissions_discharged_in(
    conn: &Connection,
    window: &QueryWindow,
) -> Result<Vec<Admission>, DatabaseError> {
    let sql = format!(
        "SELECT {ADMISSION_COLUMNS} FROM admissions
         WHERE discharged_at IS NOT NULL AND discharged_at >= ?1 AND discharged_at < ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![to_sql_instant(window.start), to_sql_instant(window.end)],
        admission_row_from_rusqlite,
    )?;
    collect_admissions(rows)
}

/// Single admission by id; `None` when it does not exist or its timestamps
/// are unusable.
pub fn fetch_admission(conn: &Connection, id: &Uuid) -> Result<Option<Admission>, DatabaseError> {
    let sql = format!("SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = ?1");
    let row: Option<AdmissionRow> = conn
        .query_row(&sql, params![id.to_string()], admission_row_from_rusqlite)
        .optional()?;
    Ok(row.and_then(admission_from_row))
}

/// Admissions by id list (presence cohort hydration).
pub fn fetch_admissions(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Admission>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id IN ({})",
        sql_placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(ids.iter().map(Uuid::to_string)),
        admission_row_from_rusqlite,
    )?;
    collect_admissions(rows)
}

/// Every admission of the given patients, ordered by admission instant.
/// Candidate source for readmission detection.
pub fn fetch_admissions_for_patients(
    conn: &Connection,
    patient_ids: &[Uuid],
) -> Result<Vec<Admission>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {ADMISSION_COLUMNS} FROM admissions WHERE patient_id IN ({})
         ORDER BY admitted_at",
        sql_placeholders(patient_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(patient_ids.iter().map(Uuid::to_string)),
        admission_row_from_rusqlite,
    )?;
    collect_admissions(rows)
}

// Internal row type for Admission mapping
struct AdmissionRow {
    id: String,
    patient_id: String,
    admitted_at: String,
    discharged_at: Option<String>,
    outcome: String,
    destination_label: Option<String>,
}

fn admission_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<AdmissionRow, rusqlite::Error> {
    Ok(AdmissionRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        admitted_at: row.get(2)?,
        discharged_at: row.get(3)?,
        outcome: row.get(4)?,
        destination_label: row.get(5)?,
    })
}

/// Maps a raw row to a typed admission; rows with unusable ids or instants
/// are dropped (`None`), they must not abort the whole computation.
fn admission_from_row(row: AdmissionRow) -> Option<Admission> {
    let id = parse_uuid(&row.id, "admissions.id")?;
    let patient_id = parse_uuid(&row.patient_id, "admissions.patient_id")?;
    let admitted_at = parse_instant(&row.admitted_at, "admissions.admitted_at")?;
    let discharged_at = match row.discharged_at {
        Some(raw) => Some(parse_instant(&raw, "admissions.discharged_at")?),
        None => None,
    };

    let outcome = AdmissionOutcome::from_str(&row.outcome).unwrap_or_else(|_| {
        tracing::warn!("Unknown outcome {:?} for admission {id}, treating as unknown", row.outcome);
        AdmissionOutcome::Unknown
    });

    Some(Admission {
        id,
        patient_id,
        admitted_at,
        discharged_at,
        outcome,
        destination_label: row.destination_label,
    })
}

fn collect_admissions(
    rows: impl Iterator<Item = Result<AdmissionRow, rusqlite::Error>>,
) -> Result<Vec<Admission>, DatabaseError> {
    let mut admissions = Vec::new();
    for row in rows {
        if let Some(admission) = admission_from_row(row?) {
            admissions.push(admission);
        }
    }
    Ok(admissions)
}

pub(crate) fn parse_uuid(raw: &str, context: &str) -> Option<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            tracing::warn!("Skipping malformed id in {context}: {raw:?} ({err})");
            None
        }
    }
}
