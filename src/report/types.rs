use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::episode::{AntibioticRanking, DeviceUtilization};
use crate::labels::DestinationSlice;
use crate::models::{DeviceKind, DosingPeriod, LabFlag};
use crate::stats::Summary;

/// The reporting period echoed back in every unit document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A duration statistic with the number of contributing admissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    #[serde(flatten)]
    pub stats: Summary,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalitySummary {
    pub deaths: u32,
    pub discharges: u32,
    pub rate: f64,
}

/// Threshold-event summary: matches over an opportunity base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRateSummary {
    pub count: u32,
    pub base: u32,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionSummary {
    pub patients: u32,
    pub total_patients: u32,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentilationSection {
    pub time_to_first_intubation_h: DurationStats,
    pub ventilated_days: DurationStats,
    pub proportion_ventilated: ProportionSummary,
    pub utilization: DeviceUtilization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicesSection {
    pub ventilation: VentilationSection,
    pub catheter: DeviceUtilization,
    pub urinary_catheter: DeviceUtilization,
    pub arterial_line: DeviceUtilization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntibioticsSection {
    pub ranking: Vec<AntibioticRanking>,
}

/// Unit-level KPI document for one sector and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitReport {
    pub period: Period,
    pub sector_id: String,
    pub cohort: CohortSummary,
    pub los: DurationStats,
    pub mortality: MortalitySummary,
    pub readmission_48h: EventRateSummary,
    pub reintubation_48h: EventRateSummary,
    pub destination_distribution: Vec<DestinationSlice>,
    pub antibiotics: AntibioticsSection,
    pub devices: DevicesSection,
}

// ── Patient-level document ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentilationPeriodView {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub end_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientVentilation {
    pub total_days: f64,
    pub time_to_first_intubation_h: Option<f64>,
    pub periods: Vec<VentilationPeriodView>,
    pub extubations: Vec<DateTime<Utc>>,
    pub reintubated_48h: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDaysByKind {
    pub device: DeviceKind,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDevices {
    pub by_kind: Vec<DeviceDaysByKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugDot {
    pub antibiotic: String,
    pub dot_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntibioticTimeline {
    pub antibiotic: String,
    pub periods: Vec<DosingPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAntibiotics {
    pub dot_by_drug: Vec<DrugDot>,
    pub timelines: Vec<AntibioticTimeline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabLatest {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub flag: LabFlag,
    pub measured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabPoint {
    pub measured_at: DateTime<Utc>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientLabs {
    pub latest_by_test: BTreeMap<String, LabLatest>,
    pub series_by_test: BTreeMap<String, Vec<LabPoint>>,
}

/// Patient-level KPI document for one admission episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientReport {
    pub admission_id: Uuid,
    pub patient_id: Uuid,
    /// Outcome label once discharged, `"in_unit"` while the episode is open.
    pub status: String,
    pub admitted_at: DateTime<Utc>,
    pub discharged_at: Option<DateTime<Utc>>,
    pub total_stay_days: f64,
    pub ventilation: PatientVentilation,
    pub devices: PatientDevices,
    pub antibiotics: PatientAntibiotics,
    pub labs: PatientLabs,
}
