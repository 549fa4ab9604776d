//! Cohort resolution: which admissions belong to a sector report.
//!
//! Two deliberately different definitions coexist:
//! - the *presence* cohort — admissions with a sector stay overlapping the
//!   window, carrying their exact in-window, in-sector duration;
//! - the *discharge* cohort — admissions discharged inside the window that
//!   ever passed through the sector (unbounded in time).
//! A patient present all window without a discharge feeds length-of-stay but
//! none of the discharge-based metrics, and vice versa.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::interval::overlap_seconds;
use crate::models::{Admission, QueryWindow, SectorStay};

/// One admission of the presence cohort with its window-clipped duration
/// inside the target sector.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceEntry {
    pub admission_id: Uuid,
    pub seconds_in_sector: f64,
}

/// Resolves the presence cohort from sector stays. A stay qualifies when
/// `start < window.end` and (`end >= window.start` or the stay is ongoing);
/// qualifying stays of one admission are summed. Output is ordered by
/// admission id for deterministic documents.
pub fn presence_cohort(
    stays: &[SectorStay],
    window: &QueryWindow,
    now: DateTime<Utc>,
) -> Vec<PresenceEntry> {
    let mut seconds_by_admission: BTreeMap<Uuid, f64> = BTreeMap::new();

    for stay in stays {
        let qualifies = stay.start < window.end
            && stay.end.map_or(true, |end| end >= window.start);
        if !qualifies {
            continue;
        }
        *seconds_by_admission.entry(stay.admission_id).or_default() +=
            overlap_seconds(stay.start, stay.end, window, now);
    }

    seconds_by_admission
        .into_iter()
        .map(|(admission_id, seconds_in_sector)| PresenceEntry { admission_id, seconds_in_sector })
        .collect()
}

/// Resolves the discharge cohort: admissions discharged inside the window
/// that ever had a stay in the target sector. `sector_admission_ids` is the
/// unbounded "ever passed through" membership set.
pub fn discharge_cohort<'a>(
    admissions: &'a [Admission],
    sector_admission_ids: &HashSet<Uuid>,
    window: &QueryWindow,
) -> Vec<&'a Admission> {
    admissions
        .iter()
        .filter(|a| a.discharged_within(window.start, window.end))
        .filter(|a| sector_admission_ids.contains(&a.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::interval::SECONDS_PER_DAY;
    use crate::models::AdmissionOutcome;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    fn stay(admission_id: Uuid, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> SectorStay {
        SectorStay {
            id: Uuid::new_v4(),
            admission_id,
            sector_id: "icu-adult".into(),
            start,
            end,
        }
    }

    fn admission(discharged_at: Option<DateTime<Utc>>) -> Admission {
        Admission {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            admitted_at: utc(2026, 1, 1),
            discharged_at,
            outcome: AdmissionOutcome::DischargedAlive,
            destination_label: None,
        }
    }

    #[test]
    fn presence_sums_multiple_stays_of_one_admission() {
        let id = Uuid::new_v4();
        let window = QueryWindow::new(utc(2026, 1, 1), utc(2026, 1, 31));
        let stays = vec![
            stay(id, utc(2026, 1, 2), Some(utc(2026, 1, 4))),
            stay(id, utc(2026, 1, 10), Some(utc(2026, 1, 11))),
        ];

        let cohort = presence_cohort(&stays, &window, utc(2026, 2, 1));
        assert_eq!(cohort.len(), 1);
        assert_eq!(cohort[0].seconds_in_sector, 3.0 * SECONDS_PER_DAY);
    }

    #[test]
    fn ongoing_stay_spanning_window_qualifies() {
        let id = Uuid::new_v4();
        let window = QueryWindow::new(utc(2026, 1, 10), utc(2026, 1, 20));
        let stays = vec![stay(id, utc(2026, 1, 1), None)];

        let cohort = presence_cohort(&stays, &window, utc(2026, 3, 1));
        assert_eq!(cohort.len(), 1);
        // Clipped by the window, not by "now"
        assert_eq!(cohort[0].seconds_in_sector, 10.0 * SECONDS_PER_DAY);
    }

    #[test]
    fn stay_ending_before_window_is_excluded() {
        let window = QueryWindow::new(utc(2026, 1, 10), utc(2026, 1, 20));
        let stays = vec![stay(Uuid::new_v4(), utc(2026, 1, 1), Some(utc(2026, 1, 5)))];
        assert!(presence_cohort(&stays, &window, utc(2026, 2, 1)).is_empty());
    }

    #[test]
    fn stay_starting_at_window_end_is_excluded() {
        let window = QueryWindow::new(utc(2026, 1, 10), utc(2026, 1, 20));
        let stays = vec![stay(Uuid::new_v4(), utc(2026, 1, 20), None)];
        assert!(presence_cohort(&stays, &window, utc(2026, 2, 1)).is_empty());
    }

    #[test]
    fn discharge_cohort_requires_both_conditions() {
        let window = QueryWindow::new(utc(2026, 1, 1), utc(2026, 2, 1));
        let in_window = admission(Some(utc(2026, 1, 15)));
        let outside_window = admission(Some(utc(2026, 3, 1)));
        let never_in_sector = admission(Some(utc(2026, 1, 20)));
        let still_in_unit = admission(None);

        let admissions = vec![
            in_window.clone(),
            outside_window,
            never_in_sector.clone(),
            still_in_unit,
        ];
        let mut members = HashSet::new();
        members.insert(in_window.id);
        // never_in_sector deliberately not inserted

        let cohort = discharge_cohort(&admissions, &members, &window);
        assert_eq!(cohort.len(), 1);
        assert_eq!(cohort[0].id, in_window.id);
    }

    #[test]
    fn discharge_at_window_end_is_excluded() {
        let window = QueryWindow::new(utc(2026, 1, 1), utc(2026, 2, 1));
        let boundary = admission(Some(utc(2026, 2, 1)));
        let mut members = HashSet::new();
        members.insert(boundary.id);

        let admissions = vec![boundary];
        assert!(discharge_cohort(&admissions, &members, &window).is_empty());
    }
}
