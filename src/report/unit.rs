use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::cohort::{discharge_cohort, presence_cohort};
use crate::db::repository;
use crate::db::DatabaseError;
use crate::episode::{antibiotic_rollup, device_utilization, ventilation_metrics};
use crate::events::{detect_readmissions, EventTally};
use crate::interval::seconds_to_days;
use crate::labels::destination_distribution;
use crate::models::{Admission, AdmissionOutcome, DeviceKind, QueryWindow};
use crate::stats::{safe_ratio, summarize};

use super::types::*;

/// Builds the unit-level KPI document for one sector and window.
///
/// All records are fetched once up front; everything after that is pure
/// composition over the snapshot, so computing the same window twice against
/// unchanged data yields identical documents. A sector with no stays simply
/// produces a zero-valued document.
pub fn build_unit_report(
    conn: &Connection,
    sector_id: &str,
    window: &QueryWindow,
    now: DateTime<Utc>,
) -> Result<UnitReport, DatabaseError> {
    tracing::debug!("Building unit report for sector {sector_id}");

    // Presence cohort: in-sector, in-window durations.
    let stays = repository::fetch_stays_overlapping(conn, sector_id, window)?;
    let presence = presence_cohort(&stays, window, now);
    let presence_ids: Vec<Uuid> = presence.iter().map(|e| e.admission_id).collect();

    let presence_admissions = repository::fetch_admissions(conn, &presence_ids)?;
    let admitted_at_by_admission: HashMap<Uuid, DateTime<Utc>> = presence_admissions
        .iter()
        .map(|a| (a.id, a.admitted_at))
        .collect();

    // Discharge cohort: discharged in window, ever passed through the sector.
    let discharged = repository::fetch_admissions_discharged_in(conn, window)?;
    let discharged_ids: Vec<Uuid> = discharged.iter().map(|a| a.id).collect();
    let ever_in_sector: HashSet<Uuid> =
        repository::fetch_stays_for_admissions(conn, sector_id, &discharged_ids)?
            .iter()
            .map(|s| s.admission_id)
            .collect();
    let discharges = discharge_cohort(&discharged, &ever_in_sector, window);

    // Length of stay: window-clipped in-sector days of the presence cohort.
    let los_days: Vec<f64> = presence
        .iter()
        .map(|e| seconds_to_days(e.seconds_in_sector))
        .collect();
    let los = DurationStats { stats: summarize(&los_days), count: presence.len() as u32 };

    let deaths = discharges
        .iter()
        .filter(|a| a.outcome == AdmissionOutcome::Deceased)
        .count() as u32;
    let mortality = MortalitySummary {
        deaths,
        discharges: discharges.len() as u32,
        rate: safe_ratio(f64::from(deaths), discharges.len() as f64, 4),
    };

    let readmission_48h = event_rate(readmission_tally(conn, sector_id, &discharges)?);

    // Ventilation metrics and reintubation over the presence cohort.
    let records = repository::fetch_ventilation_records(conn, &presence_ids)?;
    let vent = ventilation_metrics(&records, &admitted_at_by_admission, window, now);
    let reintubation_48h = event_rate(vent.reintubation);

    let aggregate = repository::fetch_device_day_aggregate(conn, sector_id, window)?;
    let total_patients = aggregate.all_admissions.len() as u32;
    let ventilated_patients = aggregate.admissions(DeviceKind::Ventilator);
    let devices = DevicesSection {
        ventilation: VentilationSection {
            time_to_first_intubation_h: DurationStats {
                stats: summarize(&vent.time_to_first_intubation_h),
                count: vent.intubated_count,
            },
            ventilated_days: DurationStats {
                stats: summarize(&vent.ventilated_days),
                count: vent.ventilated_count,
            },
            proportion_ventilated: ProportionSummary {
                patients: ventilated_patients,
                total_patients,
                fraction: safe_ratio(f64::from(ventilated_patients), f64::from(total_patients), 4),
            },
            utilization: device_utilization(&aggregate, DeviceKind::Ventilator),
        },
        catheter: device_utilization(&aggregate, DeviceKind::Catheter),
        urinary_catheter: device_utilization(&aggregate, DeviceKind::UrinaryCatheter),
        arterial_line: device_utilization(&aggregate, DeviceKind::ArterialLine),
    };

    let usages = repository::fetch_antibiotic_usage(conn, &presence_ids)?;
    let antibiotics = AntibioticsSection { ranking: antibiotic_rollup(&usages, window, now) };

    Ok(UnitReport {
        period: Period { start: window.start, end: window.end },
        sector_id: sector_id.to_string(),
        cohort: CohortSummary { count: presence.len() as u32 },
        los,
        mortality,
        readmission_48h,
        reintubation_48h,
        destination_distribution: destination_distribution(&discharges),
        antibiotics,
        devices,
    })
}

/// Fetches the readmission candidate set (every later admission of the
/// cohort's patients, restricted to those that passed through the sector)
/// and runs the event-window detector over it.
fn readmission_tally(
    conn: &Connection,
    sector_id: &str,
    discharges: &[&Admission],
) -> Result<EventTally, DatabaseError> {
    let patient_ids: Vec<Uuid> = {
        let unique: HashSet<Uuid> = discharges.iter().map(|a| a.patient_id).collect();
        let mut ids: Vec<Uuid> = unique.into_iter().collect();
        ids.sort();
        ids
    };

    let candidates = repository::fetch_admissions_for_patients(conn, &patient_ids)?;
    let candidate_ids: Vec<Uuid> = candidates.iter().map(|a| a.id).collect();
    let candidate_sector_ids: HashSet<Uuid> =
        repository::fetch_stays_for_admissions(conn, sector_id, &candidate_ids)?
            .iter()
            .map(|s| s.admission_id)
            .collect();

    let mut by_patient: HashMap<Uuid, Vec<Admission>> = HashMap::new();
    for candidate in candidates {
        by_patient.entry(candidate.patient_id).or_default().push(candidate);
    }

    Ok(detect_readmissions(discharges, &by_patient, &candidate_sector_ids))
}

fn event_rate(tally: EventTally) -> EventRateSummary {
    EventRateSummary {
        count: tally.matches,
        base: tally.base,
        rate: safe_ratio(f64::from(tally.matches), f64::from(tally.base), 4),
    }
}
