use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bookkeeping for the last completed collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchStatusEntity {
    pub run_id: Uuid,
    /// When the collection finished (UTC).
    pub last_fetched: DateTime<Utc>,
    /// Lookback horizon the run used, in days.
    pub days_back: u32,
    pub endpoints_fetched: Vec<String>,
    #[serde(default)]
    pub endpoints_unsupported: Vec<String>,
    #[serde(default)]
    pub endpoints_failed: Vec<String>,
    pub total_records: usize,
    pub version: String,
}
