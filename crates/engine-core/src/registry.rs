use crate::error::ConcurrencyConflict;
use chrono::Utc;
use model::execution::{ExecutionState, RunStatus, StepSnapshot};
use model::params::RunParams;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Live handle to one run: shared state plus the cancellation token the
/// pipeline polls between chunks.
#[derive(Clone, Debug)]
pub struct RunHandle {
    state: Arc<RwLock<ExecutionState>>,
    cancel: CancellationToken,
}

impl RunHandle {
    fn new(state: ExecutionState) -> Self {
        RunHandle {
            state: Arc::new(RwLock::new(state)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run_id(&self) -> Uuid {
        self.state.read().await.run_id
    }

    pub async fn status(&self) -> RunStatus {
        self.state.read().await.status
    }

    pub async fn snapshot(&self) -> ExecutionState {
        self.state.read().await.clone()
    }

    pub async fn set_status(&self, status: RunStatus) {
        let mut state = self.state.write().await;
        state.status = status;
        if status.is_terminal() {
            state.ended_at = Some(Utc::now());
        }
    }

    /// Moves a freshly registered run to Running. A run already asked to
    /// stop keeps its Stopping status so status queries never see it revert.
    pub async fn mark_running(&self) {
        let mut state = self.state.write().await;
        if state.status == RunStatus::Starting {
            state.status = RunStatus::Running;
        }
    }

    /// Records the first failure message; later ones are dropped.
    pub async fn record_failure(&self, message: &str) {
        let mut state = self.state.write().await;
        if state.first_failure.is_none() {
            state.first_failure = Some(message.to_string());
        }
    }

    pub async fn push_step(&self, snapshot: StepSnapshot) {
        self.state.write().await.steps.push(snapshot);
    }

    /// Requests a graceful stop. The pipeline finishes the in-flight chunk,
    /// then exits; no effect once the run is terminal.
    pub async fn stop(&self) -> bool {
        let mut state = self.state.write().await;
        if state.status.is_terminal() {
            return false;
        }
        state.status = RunStatus::Stopping;
        info!(run_id = %state.run_id, "Stop requested");
        self.cancel.cancel();
        true
    }
}

/// In-memory run registry: enforces single-run-per-job and keeps finished
/// runs around for history queries.
#[derive(Clone, Default)]
pub struct RunRegistry {
    runs: Arc<RwLock<Vec<RunHandle>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        RunRegistry {
            runs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Registers a new run, refusing while another run of the same job is
    /// still active. Holding the write lock across the scan and the insert
    /// keeps two concurrent starts from both passing the check.
    pub async fn try_begin(
        &self,
        job_name: &str,
        params: RunParams,
    ) -> Result<RunHandle, ConcurrencyConflict> {
        let mut runs = self.runs.write().await;

        for handle in runs.iter() {
            let state = handle.state.read().await;
            if state.job_name == job_name && state.status.is_active() {
                return Err(ConcurrencyConflict {
                    job_name: job_name.to_string(),
                    existing_run_id: state.run_id,
                    status: state.status.to_string(),
                });
            }
        }

        let state = ExecutionState::new(job_name, params);
        info!(run_id = %state.run_id, job = job_name, "Run registered");
        let handle = RunHandle::new(state);
        runs.push(handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, run_id: Uuid) -> Option<RunHandle> {
        let runs = self.runs.read().await;
        for handle in runs.iter() {
            if handle.state.read().await.run_id == run_id {
                return Some(handle.clone());
            }
        }
        None
    }

    /// Run states, newest first.
    pub async fn history(&self) -> Vec<ExecutionState> {
        let runs = self.runs.read().await;
        let mut states = Vec::with_capacity(runs.len());
        for handle in runs.iter() {
            states.push(handle.state.read().await.clone());
        }
        states.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_run_of_same_job_is_refused_while_active() {
        let registry = RunRegistry::new();
        let first = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();

        let err = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.job_name, "migration");
        assert_eq!(err.existing_run_id, first.run_id().await);
    }

    #[tokio::test]
    async fn terminal_run_unblocks_the_next_start() {
        let registry = RunRegistry::new();
        let first = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();
        first.set_status(RunStatus::Completed).await;

        let second = registry.try_begin("migration", RunParams::default()).await;
        assert!(second.is_ok());
        assert_eq!(registry.history().await.len(), 2);
    }

    #[tokio::test]
    async fn stop_flips_status_and_fires_the_token() {
        let registry = RunRegistry::new();
        let handle = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();

        let token = handle.cancel_token();
        assert!(handle.stop().await);
        assert!(token.is_cancelled());
        assert_eq!(handle.status().await, RunStatus::Stopping);
    }

    #[tokio::test]
    async fn stop_before_running_is_not_overwritten() {
        let registry = RunRegistry::new();
        let handle = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();

        // Stop lands before the pipeline picks the run up.
        assert!(handle.stop().await);
        handle.mark_running().await;
        assert_eq!(handle.status().await, RunStatus::Stopping);

        let fresh = RunRegistry::new();
        let handle = fresh
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();
        handle.mark_running().await;
        assert_eq!(handle.status().await, RunStatus::Running);
    }

    #[tokio::test]
    async fn stop_is_a_noop_on_terminal_runs() {
        let registry = RunRegistry::new();
        let handle = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();
        handle.set_status(RunStatus::Failed).await;

        assert!(!handle.stop().await);
        assert_eq!(handle.status().await, RunStatus::Failed);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let registry = RunRegistry::new();
        let first = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();
        first.set_status(RunStatus::Completed).await;
        let second = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();

        let history = registry.history().await;
        assert_eq!(history[0].run_id, second.run_id().await);
        assert_eq!(history[1].run_id, first.run_id().await);
    }

    #[tokio::test]
    async fn failure_message_keeps_the_first_one() {
        let registry = RunRegistry::new();
        let handle = registry
            .try_begin("migration", RunParams::default())
            .await
            .unwrap();
        handle.record_failure("first").await;
        handle.record_failure("second").await;

        assert_eq!(handle.snapshot().await.first_failure.as_deref(), Some("first"));
    }
}
