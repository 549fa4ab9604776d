use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mechanical ventilation history for one admission: discrete airway events
/// plus the ventilation sub-periods they delimit. The repository sorts both
/// event lists ascending before handing the record to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentilationRecord {
    pub admission_id: Uuid,
    pub intubations: Vec<DateTime<Utc>>,
    pub extubations: Vec<DateTime<Utc>>,
    pub periods: Vec<VentilationPeriod>,
}

/// One ventilation sub-period; `end` absent means still ventilated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentilationPeriod {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Where the end instant came from (extubation event, discharge, ...).
    pub end_source: Option<String>,
}
