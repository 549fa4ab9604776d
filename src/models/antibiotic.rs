use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One antibiotic prescribed to one admission, with its dosing periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntibioticUsage {
    pub id: Uuid,
    pub admission_id: Uuid,
    pub antibiotic: String,
    pub periods: Vec<DosingPeriod>,
}

/// Closed dosing interval — the antibiotic model has no open-ended periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
