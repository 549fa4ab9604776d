//! Typed read-snapshot entities consumed by the KPI engine.
//!
//! Every record is fetched fresh per computation by the storage layer and
//! never mutated by the core. Instants are `DateTime<Utc>` by construction;
//! values that could not be normalized to UTC are dropped at the repository
//! boundary and never reach these types.

pub mod admission;
pub mod antibiotic;
pub mod device_day;
pub mod enums;
pub mod lab;
pub mod sector_stay;
pub mod ventilation;
pub mod window;

pub use admission::*;
pub use antibiotic::*;
pub use device_day::*;
pub use enums::*;
pub use lab::*;
pub use sector_stay::*;
pub use ventilation::*;
pub use window::*;
