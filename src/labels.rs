//! Discharge-destination normalization: canonicalizes free-text destination
//! values into a fixed vocabulary, total over every admission.

use serde::{Deserialize, Serialize};

use crate::models::{Admission, AdmissionOutcome};
use crate::stats::safe_ratio;

pub const DESTINATION_WARD: &str = "ward";
pub const DESTINATION_DECEASED: &str = "deceased";
pub const DESTINATION_OTHER_HOSPITAL: &str = "other-hospital";

/// One slice of the discharge-destination distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSlice {
    pub label: String,
    pub count: u32,
    pub fraction: f64,
}

/// Maps an admission to exactly one destination label.
/// A recorded free-text label wins (trimmed, lowercased, returned verbatim);
/// otherwise the outcome decides; the fallback is the ward.
pub fn normalize_destination(admission: &Admission) -> String {
    if let Some(ref label) = admission.destination_label {
        let normalized = label.trim().to_lowercase();
        if !normalized.is_empty() {
            return normalized;
        }
    }

    match admission.outcome {
        AdmissionOutcome::DischargedAlive => DESTINATION_WARD.to_string(),
        AdmissionOutcome::Deceased => DESTINATION_DECEASED.to_string(),
        AdmissionOutcome::Transferred => DESTINATION_OTHER_HOSPITAL.to_string(),
        AdmissionOutcome::Unknown => DESTINATION_WARD.to_string(),
    }
}

/// Counts admissions per normalized label; fractions are over the cohort
/// size. Order is deterministic: count descending, then label ascending.
pub fn destination_distribution(admissions: &[&Admission]) -> Vec<DestinationSlice> {
    let mut counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    for admission in admissions {
        *counts.entry(normalize_destination(admission)).or_default() += 1;
    }

    let total: u32 = counts.values().sum();
    let mut slices: Vec<DestinationSlice> = counts
        .into_iter()
        .map(|(label, count)| DestinationSlice {
            label,
            count,
            fraction: safe_ratio(f64::from(count), f64::from(total), 4),
        })
        .collect();

    slices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    slices
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn admission(outcome: AdmissionOutcome, destination: Option<&str>) -> Admission {
        Admission {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            admitted_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            discharged_at: None,
            outcome,
            destination_label: destination.map(str::to_string),
        }
    }

    #[test]
    fn explicit_label_wins_over_outcome() {
        let a = admission(AdmissionOutcome::Deceased, Some("  Home Care "));
        assert_eq!(normalize_destination(&a), "home care");
    }

    #[test]
    fn blank_label_falls_back_to_outcome() {
        let a = admission(AdmissionOutcome::Transferred, Some("   "));
        assert_eq!(normalize_destination(&a), DESTINATION_OTHER_HOSPITAL);
    }

    #[test]
    fn outcome_mapping_is_total() {
        assert_eq!(
            normalize_destination(&admission(AdmissionOutcome::DischargedAlive, None)),
            DESTINATION_WARD
        );
        assert_eq!(
            normalize_destination(&admission(AdmissionOutcome::Deceased, None)),
            DESTINATION_DECEASED
        );
        assert_eq!(
            normalize_destination(&admission(AdmissionOutcome::Transferred, None)),
            DESTINATION_OTHER_HOSPITAL
        );
        assert_eq!(
            normalize_destination(&admission(AdmissionOutcome::Unknown, None)),
            DESTINATION_WARD
        );
    }

    #[test]
    fn distribution_counts_and_fractions() {
        let a = admission(AdmissionOutcome::DischargedAlive, None);
        let b = admission(AdmissionOutcome::DischargedAlive, None);
        let c = admission(AdmissionOutcome::Deceased, None);
        let slices = destination_distribution(&[&a, &b, &c]);

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, DESTINATION_WARD);
        assert_eq!(slices[0].count, 2);
        assert_eq!(slices[0].fraction, 0.6667);
        assert_eq!(slices[1].label, DESTINATION_DECEASED);
        assert_eq!(slices[1].fraction, 0.3333);
    }

    #[test]
    fn empty_cohort_distribution_is_empty() {
        assert!(destination_distribution(&[]).is_empty());
    }
}
