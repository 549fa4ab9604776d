//! KPI document assembly — composes cohort resolution, interval math,
//! statistics and episode metrics into the two output documents (unit-level
//! and patient-level). All records are pre-fetched snapshots; nothing in
//! here re-queries data mid-computation or retains state between calls.

pub mod patient;
pub mod types;
pub mod unit;

pub use patient::*;
pub use types::*;
pub use unit::*;

// ── Tests ──────────────────────────────────────────────────────────────────
