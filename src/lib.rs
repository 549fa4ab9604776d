//! Clinical operations KPI engine for intensive-care units.
//!
//! Computes unit-level indicators (length of stay, mortality, 48h
//! readmission and reintubation, device utilization, antibiotic days of
//! therapy) over a half-open query window, and patient-level episode
//! summaries, against a read-only SQLite record store.

pub mod cohort;
pub mod config;
pub mod db;
pub mod episode;
pub mod events;
pub mod interval;
pub mod labels;
pub mod models;
pub mod report;
pub mod stats;
