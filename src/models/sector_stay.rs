use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One contiguous presence of an admission in a sector.
/// `end` absent means the stay is ongoing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorStay {
    pub id: Uuid,
    pub admission_id: Uuid,
    pub sector_id: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}
