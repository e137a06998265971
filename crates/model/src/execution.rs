use crate::params::RunParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Starting,
    Running,
    Completed,
    Failed,
    Stopping,
    Stopped,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Starting => "STARTING",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
            RunStatus::Stopping => "STOPPING",
            RunStatus::Stopped => "STOPPED",
        }
    }

    /// Active statuses block a new run of the same job.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RunStatus::Starting | RunStatus::Running | RunStatus::Stopping
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Stopped
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen per-domain counter values recorded when a step finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub domain: String,
    pub read_count: u64,
    pub write_count: u64,
    pub read_skip_count: u64,
    pub process_skip_count: u64,
    pub write_skip_count: u64,
    pub commit_count: u64,
    pub rollback_count: u64,
}

impl StepSnapshot {
    pub fn total_skips(&self) -> u64 {
        self.read_skip_count + self.process_skip_count + self.write_skip_count
    }
}

/// Full state of one run: identity, status, timestamps and per-step counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    pub run_id: Uuid,
    pub job_name: String,
    pub status: RunStatus,
    pub params: RunParams,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepSnapshot>,
    /// First captured failure message, surfaced instead of a stack trace.
    pub first_failure: Option<String>,
}

impl ExecutionState {
    pub fn new(job_name: &str, params: RunParams) -> Self {
        ExecutionState {
            run_id: Uuid::new_v4(),
            job_name: job_name.to_string(),
            status: RunStatus::Starting,
            params,
            started_at: Utc::now(),
            ended_at: None,
            steps: Vec::new(),
            first_failure: None,
        }
    }

    pub fn total_read(&self) -> u64 {
        self.steps.iter().map(|s| s.read_count).sum()
    }

    pub fn total_written(&self) -> u64 {
        self.steps.iter().map(|s| s.write_count).sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.steps.iter().map(|s| s.total_skips()).sum()
    }
}
