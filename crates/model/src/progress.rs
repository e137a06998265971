use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot published to the notification channel while a step runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressMessage {
    pub run_id: Uuid,
    pub domain: String,
    pub status: String,
    pub read_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    /// Records per second since step start.
    pub read_speed: f64,
    pub write_speed: f64,
    pub elapsed_seconds: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}
