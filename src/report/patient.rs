use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::events::count_reintubations;
use crate::interval::{days_between, hours_between, seconds_to_days};
use crate::models::{lab, DeviceKind, LabResult, VentilationRecord};
use crate::stats::round_to;

use super::types::*;

/// Builds the patient-level KPI document for one admission episode.
/// Unknown admission surfaces as `DatabaseError::NotFound`.
pub fn build_patient_report(
    conn: &Connection,
    admission_id: &Uuid,
    now: DateTime<Utc>,
) -> Result<PatientReport, DatabaseError> {
    let admission = repository::fetch_admission(conn, admission_id)?.ok_or_else(|| {
        DatabaseError::NotFound { entity_type: "admission".into(), id: admission_id.to_string() }
    })?;

    let status = match admission.discharged_at {
        Some(_) => admission.outcome.as_str().to_string(),
        None => "in_unit".to_string(),
    };
    let stay_end = admission.discharged_at.unwrap_or(now);
    let total_stay_days = round_to(days_between(admission.admitted_at, stay_end), 2);

    let record = repository::fetch_ventilation_records(conn, &[*admission_id])?
        .into_iter()
        .next()
        .unwrap_or_else(|| VentilationRecord {
            admission_id: *admission_id,
            intubations: Vec::new(),
            extubations: Vec::new(),
            periods: Vec::new(),
        });
    let ventilation = ventilation_block(&record, admission.admitted_at, now);

    let device_days = repository::fetch_device_days_for_admission(conn, admission_id)?;
    let by_kind = [
        DeviceKind::Ventilator,
        DeviceKind::Catheter,
        DeviceKind::UrinaryCatheter,
        DeviceKind::ArterialLine,
    ]
    .into_iter()
    .map(|device| DeviceDaysByKind {
        device,
        days: device_days.iter().filter(|row| row.has(device)).count() as u32,
    })
    .collect();

    let usages = repository::fetch_antibiotic_usage(conn, &[*admission_id])?;
    let mut dot_by_drug: BTreeMap<String, f64> = BTreeMap::new();
    let mut timelines = Vec::with_capacity(usages.len());
    for usage in &usages {
        let days: f64 = usage
            .periods
            .iter()
            .map(|p| seconds_to_days((p.end - p.start).num_milliseconds() as f64 / 1_000.0))
            .sum();
        *dot_by_drug.entry(usage.antibiotic.clone()).or_default() += days;
        timelines.push(AntibioticTimeline {
            antibiotic: usage.antibiotic.clone(),
            periods: usage.periods.clone(),
        });
    }
    let antibiotics = PatientAntibiotics {
        dot_by_drug: dot_by_drug
            .into_iter()
            .map(|(antibiotic, days)| DrugDot { antibiotic, dot_days: round_to(days, 2) })
            .collect(),
        timelines,
    };

    let labs = lab_block(&repository::fetch_lab_results(conn, admission_id)?);

    Ok(PatientReport {
        admission_id: admission.id,
        patient_id: admission.patient_id,
        status,
        admitted_at: admission.admitted_at,
        discharged_at: admission.discharged_at,
        total_stay_days,
        ventilation,
        devices: PatientDevices { by_kind },
        antibiotics,
        labs,
    })
}

/// Ventilation block of the patient document. Total time includes open
/// periods (clipped at `now`), not restricted to any window.
fn ventilation_block(
    record: &VentilationRecord,
    admitted_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> PatientVentilation {
    let total_days: f64 = record
        .periods
        .iter()
        .map(|p| {
            let end = p.end.unwrap_or(now);
            if end > p.start {
                days_between(p.start, end)
            } else {
                0.0
            }
        })
        .sum();

    PatientVentilation {
        total_days: round_to(total_days, 2),
        time_to_first_intubation_h: record
            .intubations
            .first()
            .map(|&first| round_to(hours_between(admitted_at, first), 2)),
        periods: record
            .periods
            .iter()
            .map(|p| VentilationPeriodView {
                start: p.start,
                end: p.end,
                end_source: p.end_source.clone(),
            })
            .collect(),
        extubations: record.extubations.clone(),
        reintubated_48h: count_reintubations(&record.extubations, &record.intubations).matches > 0,
    }
}

/// Buckets lab results by test: the latest value per test (with its
/// reference flag) plus the full chronological series. Input is ordered by
/// (test_name, measured_at).
fn lab_block(results: &[LabResult]) -> PatientLabs {
    let mut latest_by_test: BTreeMap<String, LabLatest> = BTreeMap::new();
    let mut series_by_test: BTreeMap<String, Vec<LabPoint>> = BTreeMap::new();

    for result in results {
        series_by_test
            .entry(result.test_name.clone())
            .or_default()
            .push(LabPoint { measured_at: result.measured_at, value: result.value });

        let candidate = LabLatest {
            value: result.value,
            unit: result.unit.clone(),
            flag: result
                .value
                .map_or(crate::models::LabFlag::Normal, |v| lab::flag_for(&result.test_name, v)),
            measured_at: result.measured_at,
        };
        latest_by_test
            .entry(result.test_name.clone())
            .and_modify(|current| {
                if candidate.measured_at >= current.measured_at {
                    *current = candidate.clone();
                }
            })
            .or_insert(candidate);
    }

    PatientLabs { latest_by_test, series_by_test }
}
