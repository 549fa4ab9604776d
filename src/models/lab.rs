use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::LabFlag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResult {
    pub id: Uuid,
    pub admission_id: Uuid,
    pub test_name: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub measured_at: DateTime<Utc>,
}

/// Flags a numeric result against fixed local reference limits.
/// Thresholds follow the unit's protocol; adjust there, not per caller.
pub fn flag_for(test_name: &str, value: f64) -> LabFlag {
    let v = value;
    match test_name {
        "creatinine" if v > 1.2 => LabFlag::High,
        "urea" if v > 50.0 => LabFlag::High,
        "hb" if v < 12.0 => LabFlag::Low,
        "leukocytes" if v > 11_000.0 => LabFlag::High,
        "leukocytes" if v < 4_000.0 => LabFlag::Low,
        "platelets" if v < 150_000.0 => LabFlag::Low,
        "ph" if v < 7.35 => LabFlag::Acidosis,
        "ph" if v > 7.45 => LabFlag::Alkalosis,
        "pco2" if v > 45.0 => LabFlag::High,
        "pco2" if v < 35.0 => LabFlag::Low,
        "po2" if v < 60.0 => LabFlag::Low,
        "hco3" if v < 22.0 => LabFlag::Low,
        "hco3" if v > 26.0 => LabFlag::High,
        "lactate" if v > 2.0 => LabFlag::High,
        "glucose" if v < 70.0 => LabFlag::Low,
        "glucose" if v > 180.0 => LabFlag::High,
        _ => LabFlag::Normal,
    }
}
