use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AdmissionOutcome;

/// One hospital admission episode. `discharged_at` absent means the patient
/// is still in the unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admission {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub admitted_at: DateTime<Utc>,
    pub discharged_at: Option<DateTime<Utc>>,
    pub outcome: AdmissionOutcome,
    pub destination_label: Option<String>,
}

impl Admission {
    /// True when the discharge instant falls inside the half-open window.
    pub fn discharged_within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.discharged_at
            .is_some_and(|d| d >= start && d < end)
    }
}
