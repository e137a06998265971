use crate::flow::{COMPANY_DOMAIN, CUSTOMER_DOMAIN, FlowConfig, JobStores};
use crate::rollback::RollbackHook;
use connectors::tsv::{FromTsvRow, TsvSource};
use engine_core::bus::ProgressBus;
use engine_core::progress::{DEFAULT_REPORT_INTERVAL, ProgressTracker};
use engine_core::registry::RunHandle;
use engine_processing::gate::{DecisionGate, GateDecision};
use engine_processing::step::{MigrationStep, StepStatus};
use engine_processing::transform::mask::{DataMasker, MaskTarget};
use engine_processing::transform::{CompanyTransformer, CustomerTransformer};
use engine_processing::validate::{CompanyValidator, CustomerValidator};
use engine_processing::writer::ChunkWriter;
use model::execution::{ExecutionState, RunStatus};
use model::params::RunParams;
use model::records::{CompanyRecord, CompanyRow, CustomerRecord, CustomerRow, SourceRecord, TargetRow};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

enum DomainResult {
    Completed,
    Stopped,
    Failed(String),
}

/// Runs one migration job: the customer flow, then the company flow, each
/// gated by the run's target selector. The first failed or stopped domain
/// ends the run; later domains never start.
pub struct MigrationPipeline {
    config: FlowConfig,
    stores: JobStores,
    bus: ProgressBus,
    gate: DecisionGate,
    rollback: RollbackHook,
}

impl MigrationPipeline {
    pub fn new(config: FlowConfig, stores: JobStores, bus: ProgressBus) -> Self {
        MigrationPipeline {
            config,
            stores,
            bus,
            gate: DecisionGate,
            rollback: RollbackHook,
        }
    }

    /// Drives the run to a terminal status and returns its final state.
    pub async fn execute(&self, handle: RunHandle) -> ExecutionState {
        let run_id = handle.run_id().await;
        let params = handle.snapshot().await.params;
        handle.mark_running().await;
        info!(run_id = %run_id, targets = ?params.targets, mode = ?params.write_mode, "Run started");

        let tracker = ProgressTracker::new(run_id, self.bus.clone());
        let reporter_cancel = CancellationToken::new();
        let reporter = tracker.spawn_reporter(DEFAULT_REPORT_INTERVAL, reporter_cancel.clone());

        let mut final_status = RunStatus::Completed;

        for domain in [CUSTOMER_DOMAIN, COMPANY_DOMAIN] {
            if self.gate.decide(&params, domain) == GateDecision::Skip {
                continue;
            }

            tracker.begin_domain(domain).await;
            let result = match domain {
                CUSTOMER_DOMAIN => {
                    self.run_domain(
                        domain,
                        &self.config.customer_file,
                        self.customer_step(&params),
                        &tracker,
                        &handle,
                    )
                    .await
                }
                _ => {
                    self.run_domain(
                        domain,
                        &self.config.company_file,
                        self.company_step(&params),
                        &tracker,
                        &handle,
                    )
                    .await
                }
            };

            match result {
                DomainResult::Completed => {
                    tracker.final_report("COMPLETED").await;
                }
                DomainResult::Stopped => {
                    tracker.final_report("STOPPED").await;
                    final_status = RunStatus::Stopped;
                    break;
                }
                DomainResult::Failed(message) => {
                    error!(run_id = %run_id, domain, %message, "Step failed, ending run");
                    handle.record_failure(&message).await;
                    tracker.final_report("FAILED").await;
                    final_status = RunStatus::Failed;
                    break;
                }
            }
        }

        reporter_cancel.cancel();
        let _ = reporter.await;

        handle.set_status(final_status).await;
        let state = handle.snapshot().await;
        info!(
            run_id = %run_id,
            status = %state.status,
            read = state.total_read(),
            written = state.total_written(),
            skipped = state.total_skipped(),
            "Run finished"
        );
        self.rollback.after_run(&state);
        state
    }

    async fn run_domain<S, T>(
        &self,
        domain: &str,
        path: &Path,
        step: MigrationStep<S, T>,
        tracker: &ProgressTracker,
        handle: &RunHandle,
    ) -> DomainResult
    where
        S: SourceRecord + FromTsvRow,
        T: TargetRow + MaskTarget,
    {
        let mut source = match TsvSource::open(path) {
            Ok(source) => source,
            Err(err) => return DomainResult::Failed(err.to_string()),
        };

        let counters = tracker.counters();
        match step.run(&mut source, &counters, &handle.cancel_token()).await {
            Ok(outcome) => {
                if let Some(cause) = &outcome.first_failure {
                    warn!(domain, %cause, "Step finished with skips");
                }
                handle.push_step(outcome.snapshot).await;
                match outcome.status {
                    StepStatus::Completed => DomainResult::Completed,
                    StepStatus::Stopped => DomainResult::Stopped,
                }
            }
            Err(err) => {
                // Counters up to the failure still make it into the summary.
                handle.push_step(counters.snapshot(domain)).await;
                DomainResult::Failed(err.to_string())
            }
        }
    }

    fn customer_step(&self, params: &RunParams) -> MigrationStep<CustomerRecord, CustomerRow> {
        MigrationStep::new(
            CUSTOMER_DOMAIN,
            Arc::new(CustomerValidator),
            Arc::new(CustomerTransformer::new(
                self.stores.customers.clone(),
                params.write_mode,
            )),
            ChunkWriter::new(self.stores.customers.clone(), params.write_mode),
            DataMasker::new(params.masking.clone()),
            params.clone(),
        )
    }

    fn company_step(&self, params: &RunParams) -> MigrationStep<CompanyRecord, CompanyRow> {
        MigrationStep::new(
            COMPANY_DOMAIN,
            Arc::new(CompanyValidator),
            Arc::new(CompanyTransformer::new(
                self.stores.companies.clone(),
                params.write_mode,
            )),
            ChunkWriter::new(self.stores.companies.clone(), params.write_mode),
            DataMasker::new(params.masking.clone()),
            params.clone(),
        )
    }
}
