//! Threshold-based clinical event detection: "next qualifying event within
//! N hours" over sorted instant sequences. Instantiated twice — 48-hour
//! readmission (discharge → next same-sector admission) and 48-hour
//! reintubation (extubation → next intubation).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Admission, AdmissionOutcome};

/// Both instantiations share the 48-hour clinical threshold.
pub const EVENT_WINDOW_HOURS: i64 = 48;

/// Match count over an opportunity base, ready for `safe_ratio`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTally {
    pub matches: u32,
    pub base: u32,
}

impl EventTally {
    pub fn absorb(&mut self, other: EventTally) {
        self.matches += other.matches;
        self.base += other.base;
    }
}

/// Earliest candidate strictly after the trigger, if its gap is within the
/// threshold. `candidates` must be sorted ascending.
pub fn first_within(
    trigger: DateTime<Utc>,
    candidates: &[DateTime<Utc>],
    threshold: Duration,
) -> Option<DateTime<Utc>> {
    candidates
        .iter()
        .find(|&&candidate| candidate > trigger)
        .copied()
        .filter(|candidate| *candidate - trigger <= threshold)
}

/// Evaluates every extubation independently against the admission's
/// intubation instants. Each extubation is one opportunity in the base; an
/// admission with three extubations contributes up to three matches. Both
/// sequences must be sorted ascending.
pub fn count_reintubations(
    extubations: &[DateTime<Utc>],
    intubations: &[DateTime<Utc>],
) -> EventTally {
    let threshold = Duration::hours(EVENT_WINDOW_HOURS);
    let mut tally = EventTally { matches: 0, base: extubations.len() as u32 };

    for &extubation in extubations {
        if first_within(extubation, intubations, threshold).is_some() {
            tally.matches += 1;
        }
    }
    tally
}

/// Detects 48-hour readmissions over a discharge cohort. Triggers are
/// discharges with outcome discharged-alive only (mirroring the upstream
/// filter); candidates are the same patient's later admission instants whose
/// admission also passed through the target sector.
pub fn detect_readmissions(
    discharges: &[&Admission],
    admissions_by_patient: &HashMap<Uuid, Vec<Admission>>,
    sector_admission_ids: &HashSet<Uuid>,
) -> EventTally {
    let threshold = Duration::hours(EVENT_WINDOW_HOURS);
    let mut tally = EventTally::default();

    for discharge in discharges {
        if discharge.outcome != AdmissionOutcome::DischargedAlive {
            continue;
        }
        let Some(discharged_at) = discharge.discharged_at else {
            continue;
        };
        tally.base += 1;

        let candidates: Vec<DateTime<Utc>> = admissions_by_patient
            .get(&discharge.patient_id)
            .map(|admissions| {
                let mut instants: Vec<DateTime<Utc>> = admissions
                    .iter()
                    .filter(|a| a.id != discharge.id)
                    .filter(|a| sector_admission_ids.contains(&a.id))
                    .map(|a| a.admitted_at)
                    .collect();
                instants.sort();
                instants
            })
            .unwrap_or_default();

        if first_within(discharged_at, &candidates, threshold).is_some() {
            tally.matches += 1;
        }
    }
    tally
}
