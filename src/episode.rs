//! Per-admission episode metrics: ventilation timings, device-day
//! utilization, and antibiotic days-of-therapy, all computed over the
//! presence cohort's pre-fetched records.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::{count_reintubations, EventTally};
use crate::interval::{hours_between, overlap_seconds, seconds_to_days};
use crate::models::{AntibioticUsage, DeviceDayAggregate, DeviceKind, QueryWindow, VentilationRecord};
use crate::stats::{round_to, safe_ratio};

/// Raw ventilation samples and tallies for one cohort, ready for
/// `stats::summarize`.
#[derive(Debug, Clone, Default)]
pub struct VentilationMetrics {
    /// Hours from admission to first intubation, one sample per intubated
    /// admission with a known admission instant. Not window-restricted.
    pub time_to_first_intubation_h: Vec<f64>,
    /// Window-clipped ventilated days, one sample per admission with a
    /// positive overlap. Open periods extend to "now".
    pub ventilated_days: Vec<f64>,
    pub intubated_count: u32,
    pub ventilated_count: u32,
    pub reintubation: EventTally,
}

/// Derives ventilation metrics for every record of the cohort.
/// `admitted_at_by_admission` supplies the admission instants for the
/// time-to-first-intubation samples.
pub fn ventilation_metrics(
    records: &[VentilationRecord],
    admitted_at_by_admission: &HashMap<Uuid, DateTime<Utc>>,
    window: &QueryWindow,
    now: DateTime<Utc>,
) -> VentilationMetrics {
    let mut metrics = VentilationMetrics::default();

    for record in records {
        if let Some(&first_intubation) = record.intubations.first() {
            metrics.intubated_count += 1;
            if let Some(&admitted_at) = admitted_at_by_admission.get(&record.admission_id) {
                metrics
                    .time_to_first_intubation_h
                    .push(hours_between(admitted_at, first_intubation));
            }
        }

        let total_seconds: f64 = record
            .periods
            .iter()
            .map(|p| overlap_seconds(p.start, p.end, window, now))
            .sum();
        if total_seconds > 0.0 {
            metrics.ventilated_count += 1;
            metrics.ventilated_days.push(seconds_to_days(total_seconds));
        }

        metrics
            .reintubation
            .absorb(count_reintubations(&record.extubations, &record.intubations));
    }

    metrics
}

/// Day-level utilization of one device type over the patient-day
/// denominator, plus patient prevalence over distinct admissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceUtilization {
    pub device_days: u32,
    pub patient_days: u32,
    pub utilization: f64,
    pub patients: u32,
    pub total_patients: u32,
    pub patient_fraction: f64,
}

/// Reduces the pre-scoped device-day aggregate to ratios for one device
/// kind. No interval math: the rows are already day-granular.
pub fn device_utilization(aggregate: &DeviceDayAggregate, kind: DeviceKind) -> DeviceUtilization {
    let device_days = aggregate.days(kind);
    let patients = aggregate.admissions(kind);
    let total_patients = aggregate.all_admissions.len() as u32;

    DeviceUtilization {
        device_days,
        patient_days: aggregate.patient_days,
        utilization: safe_ratio(f64::from(device_days), f64::from(aggregate.patient_days), 4),
        patients,
        total_patients,
        patient_fraction: safe_ratio(f64::from(patients), f64::from(total_patients), 4),
    }
}

/// One antibiotic's in-window exposure across the cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntibioticRanking {
    pub antibiotic: String,
    pub dot_days: f64,
    pub patients_exposed: u32,
}

/// Window-clipped days-of-therapy per antibiotic name, with the count of
/// distinct admissions having at least one positive-overlap dosing period.
/// Drugs with no in-window exposure are omitted. Sorted by DOT descending,
/// then name.
pub fn antibiotic_rollup(
    usages: &[AntibioticUsage],
    window: &QueryWindow,
    now: DateTime<Utc>,
) -> Vec<AntibioticRanking> {
    let mut dot_by_drug: BTreeMap<String, f64> = BTreeMap::new();
    let mut exposed_by_drug: BTreeMap<String, HashSet<Uuid>> = BTreeMap::new();

    for usage in usages {
        let seconds: f64 = usage
            .periods
            .iter()
            .map(|p| overlap_seconds(p.start, Some(p.end), window, now))
            .sum();
        if seconds <= 0.0 {
            continue;
        }
        *dot_by_drug.entry(usage.antibiotic.clone()).or_default() += seconds_to_days(seconds);
        exposed_by_drug
            .entry(usage.antibiotic.clone())
            .or_default()
            .insert(usage.admission_id);
    }

    let mut ranking: Vec<AntibioticRanking> = dot_by_drug
        .into_iter()
        .map(|(antibiotic, dot)| AntibioticRanking {
            patients_exposed: exposed_by_drug.get(&antibiotic).map_or(0, |s| s.len() as u32),
            dot_days: round_to(dot, 2),
            antibiotic,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.dot_days
            .total_cmp(&a.dot_days)
            .then_with(|| a.antibiotic.cmp(&b.antibiotic))
    });
    ranking
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::models::{DosingPeriod, VentilationPeriod};

    use super::*;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, d, h, 0, 0).unwrap()
    }

    fn window() -> QueryWindow {
        QueryWindow::new(utc(1, 0), utc(31, 0))
    }

    #[test]
    fn time_to_first_intubation_is_global_not_window_restricted() {
        let admission_id = Uuid::new_v4();
        let record = VentilationRecord {
            admission_id,
            intubations: vec![utc(2, 6)],
            extubations: vec![],
            periods: vec![],
        };
        let mut admitted = HashMap::new();
        admitted.insert(admission_id, utc(1, 0));

        // Window far away from the intubation instant
        let narrow = QueryWindow::new(utc(20, 0), utc(21, 0));
        let metrics = ventilation_metrics(&[record], &admitted, &narrow, utc(30, 0));

        assert_eq!(metrics.intubated_count, 1);
        assert_eq!(metrics.time_to_first_intubation_h, vec![30.0]);
    }

    #[test]
    fn ventilated_days_are_window_clipped_and_open_periods_extend() {
        let admission_id = Uuid::new_v4();
        let record = VentilationRecord {
            admission_id,
            intubations: vec![],
            extubations: vec![],
            periods: vec![
                VentilationPeriod { start: utc(1, 0), end: Some(utc(3, 0)), end_source: None },
                VentilationPeriod { start: utc(10, 0), end: None, end_source: None },
            ],
        };

        let w = QueryWindow::new(utc(2, 0), utc(12, 0));
        let metrics = ventilation_metrics(&[record], &HashMap::new(), &w, utc(11, 0));

        // Closed: [2,3) = 1 day in window; open: [10, now=11) = 1 day
        assert_eq!(metrics.ventilated_count, 1);
        assert_eq!(metrics.ventilated_days, vec![2.0]);
    }

    #[test]
    fn record_without_overlap_is_not_counted_ventilated() {
        let record = VentilationRecord {
            admission_id: Uuid::new_v4(),
            intubations: vec![],
            extubations: vec![],
            periods: vec![VentilationPeriod {
                start: utc(1, 0),
                end: Some(utc(2, 0)),
                end_source: None,
            }],
        };
        let w = QueryWindow::new(utc(10, 0), utc(20, 0));
        let metrics = ventilation_metrics(&[record], &HashMap::new(), &w, utc(30, 0));
        assert_eq!(metrics.ventilated_count, 0);
        assert!(metrics.ventilated_days.is_empty());
    }

    #[test]
    fn reintubation_tally_accumulates_across_records() {
        let make = |ext: Vec<DateTime<Utc>>, intu: Vec<DateTime<Utc>>| VentilationRecord {
            admission_id: Uuid::new_v4(),
            intubations: intu,
            extubations: ext,
            periods: vec![],
        };
        let records = vec![
            make(vec![utc(1, 0)], vec![utc(1, 0), utc(1, 5)]),
            make(vec![utc(5, 0)], vec![]),
        ];
        let metrics = ventilation_metrics(&records, &HashMap::new(), &window(), utc(30, 0));
        assert_eq!(metrics.reintubation, EventTally { matches: 1, base: 2 });
    }

    #[test]
    fn device_utilization_ratios() {
        use crate::models::DeviceDayRecord;

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let day = |admission_id, d: u32, ventilated| DeviceDayRecord {
            admission_id,
            sector_id: "icu-adult".into(),
            day: chrono::NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
            catheter: false,
            urinary_catheter: false,
            arterial_line: false,
            ventilated,
        };
        let rows = vec![day(a, 1, true), day(a, 2, true), day(b, 1, false), day(b, 2, false)];
        let aggregate = DeviceDayAggregate::from_rows(&rows);

        let vent = device_utilization(&aggregate, DeviceKind::Ventilator);
        assert_eq!(vent.device_days, 2);
        assert_eq!(vent.patient_days, 4);
        assert_eq!(vent.utilization, 0.5);
        assert_eq!(vent.patients, 1);
        assert_eq!(vent.total_patients, 2);
        assert_eq!(vent.patient_fraction, 0.5);

        let cath = device_utilization(&aggregate, DeviceKind::Catheter);
        assert_eq!(cath.utilization, 0.0);
        assert_eq!(cath.patient_fraction, 0.0);
    }

    #[test]
    fn empty_aggregate_is_all_zeros() {
        let aggregate = DeviceDayAggregate::default();
        let u = device_utilization(&aggregate, DeviceKind::ArterialLine);
        assert_eq!(u.utilization, 0.0);
        assert_eq!(u.patient_days, 0);
    }

    #[test]
    fn antibiotic_dot_is_window_clipped_and_ranked() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let usage = |admission_id, drug: &str, start, end| AntibioticUsage {
            id: Uuid::new_v4(),
            admission_id,
            antibiotic: drug.into(),
            periods: vec![DosingPeriod { start, end }],
        };

        let w = QueryWindow::new(utc(5, 0), utc(15, 0));
        let usages = vec![
            // 3 days before the window + 2 inside -> 2 DOT days
            usage(a, "meropenem", utc(2, 0), utc(7, 0)),
            usage(b, "meropenem", utc(8, 0), utc(9, 0)),
            usage(a, "vancomycin", utc(10, 0), utc(10, 12)),
            // Fully outside the window -> omitted
            usage(b, "cefepime", utc(20, 0), utc(25, 0)),
        ];

        let ranking = antibiotic_rollup(&usages, &w, utc(30, 0));
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].antibiotic, "meropenem");
        assert_eq!(ranking[0].dot_days, 3.0);
        assert_eq!(ranking[0].patients_exposed, 2);
        assert_eq!(ranking[1].antibiotic, "vancomycin");
        assert_eq!(ranking[1].dot_days, 0.5);
        assert_eq!(ranking[1].patients_exposed, 1);
    }

    #[test]
    fn antibiotic_rollup_empty_input() {
        assert!(antibiotic_rollup(&[], &window(), utc(30, 0)).is_empty());
    }
}
