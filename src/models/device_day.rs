use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DeviceKind;

/// One row per admission per calendar day per sector, with device flags.
/// Day-level prevalence source, independent from the interval model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDayRecord {
    pub admission_id: Uuid,
    pub sector_id: String,
    pub day: NaiveDate,
    pub catheter: bool,
    pub urinary_catheter: bool,
    pub arterial_line: bool,
    pub ventilated: bool,
}

impl DeviceDayRecord {
    pub fn has(&self, kind: DeviceKind) -> bool {
        match kind {
            DeviceKind::Ventilator => self.ventilated,
            DeviceKind::Catheter => self.catheter,
            DeviceKind::UrinaryCatheter => self.urinary_catheter,
            DeviceKind::ArterialLine => self.arterial_line,
        }
    }
}

/// Device-day rows already scoped to one sector and window, reduced to the
/// counts and distinct admission sets the prevalence ratios need.
#[derive(Debug, Clone, Default)]
pub struct DeviceDayAggregate {
    pub patient_days: u32,
    pub days_by_kind: HashMap<DeviceKind, u32>,
    pub admissions_by_kind: HashMap<DeviceKind, HashSet<Uuid>>,
    pub all_admissions: HashSet<Uuid>,
}

impl DeviceDayAggregate {
    /// Folds raw rows into the aggregate; rows are assumed pre-scoped.
    pub fn from_rows(rows: &[DeviceDayRecord]) -> Self {
        let mut agg = Self::default();
        for row in rows {
            agg.patient_days += 1;
            agg.all_admissions.insert(row.admission_id);
            for kind in [
                DeviceKind::Ventilator,
                DeviceKind::Catheter,
                DeviceKind::UrinaryCatheter,
                DeviceKind::ArterialLine,
            ] {
                if row.has(kind) {
                    *agg.days_by_kind.entry(kind).or_default() += 1;
                    agg.admissions_by_kind.entry(kind).or_default().insert(row.admission_id);
                }
            }
        }
        agg
    }

    pub fn days(&self, kind: DeviceKind) -> u32 {
        self.days_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn admissions(&self, kind: DeviceKind) -> u32 {
        self.admissions_by_kind.get(&kind).map_or(0, |s| s.len() as u32)
    }
}
