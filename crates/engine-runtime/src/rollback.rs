use model::execution::{ExecutionState, RunStatus};
use tracing::{info, warn};

/// Compensation hook invoked when a run ends failed or stopped.
///
/// Target rows carry no per-run marker, so already-committed chunks cannot
/// be attributed to the run that wrote them. Until the schema gains one,
/// the hook reports what was left behind and deletes nothing; committed
/// chunks from an aborted run remain in the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackHook;

impl RollbackHook {
    pub fn after_run(&self, state: &ExecutionState) {
        match state.status {
            RunStatus::Failed | RunStatus::Stopped => {
                warn!(
                    run_id = %state.run_id,
                    status = %state.status,
                    written = state.total_written(),
                    "Run ended abnormally; committed rows are not removed"
                );
                for step in &state.steps {
                    if step.write_count > 0 {
                        warn!(
                            run_id = %state.run_id,
                            domain = %step.domain,
                            written = step.write_count,
                            "Rows committed before the run ended"
                        );
                    }
                }
            }
            RunStatus::Completed => {
                info!(run_id = %state.run_id, "Run completed, no compensation needed");
            }
            _ => {}
        }
    }
}
