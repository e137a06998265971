use crate::error::RuntimeError;
use crate::flow::{COMPANY_DOMAIN, CUSTOMER_DOMAIN, FlowConfig, JOB_NAME, JobStores};
use crate::pipeline::MigrationPipeline;
use crate::report;
use connectors::tsv::count_data_rows;
use engine_core::bus::ProgressBus;
use engine_core::registry::RunRegistry;
use model::execution::ExecutionState;
use model::params::RunParams;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Row counts gathered before a run, without touching the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    pub customer_rows: Option<u64>,
    pub company_rows: Option<u64>,
}

impl PreflightReport {
    pub fn total(&self) -> u64 {
        self.customer_rows.unwrap_or(0) + self.company_rows.unwrap_or(0)
    }
}

/// Operational surface of the engine: start, stop, inspect and pre-check
/// runs. One job at a time; a second start while a run is active is refused.
pub struct JobController {
    config: FlowConfig,
    registry: RunRegistry,
    pipeline: Arc<MigrationPipeline>,
    report_dir: Option<PathBuf>,
}

impl JobController {
    pub fn new(
        config: FlowConfig,
        stores: JobStores,
        bus: ProgressBus,
        report_dir: Option<PathBuf>,
    ) -> Self {
        let pipeline = Arc::new(MigrationPipeline::new(config.clone(), stores, bus));
        JobController {
            config,
            registry: RunRegistry::new(),
            pipeline,
            report_dir,
        }
    }

    /// Starts a run in the background and returns its id immediately.
    pub async fn start(&self, params: RunParams) -> Result<Uuid, RuntimeError> {
        let handle = self.registry.try_begin(JOB_NAME, params).await?;
        let run_id = handle.run_id().await;

        let pipeline = self.pipeline.clone();
        let report_dir = self.report_dir.clone();
        tokio::spawn(async move {
            let state = pipeline.execute(handle).await;
            write_report(report_dir.as_deref(), &state);
        });

        Ok(run_id)
    }

    /// Runs a migration to its terminal state, then writes the statistics
    /// report. Single-shot entry point for command-line runs.
    pub async fn run_to_completion(
        &self,
        params: RunParams,
    ) -> Result<ExecutionState, RuntimeError> {
        let handle = self.registry.try_begin(JOB_NAME, params).await?;
        let state = self.pipeline.execute(handle).await;
        write_report(self.report_dir.as_deref(), &state);
        Ok(state)
    }

    /// Requests a graceful stop of an active run.
    pub async fn stop(&self, run_id: Uuid) -> Result<(), RuntimeError> {
        let handle = self
            .registry
            .get(run_id)
            .await
            .ok_or(RuntimeError::RunNotFound(run_id))?;

        if handle.stop().await {
            Ok(())
        } else {
            Err(RuntimeError::RunNotActive(run_id))
        }
    }

    pub async fn status(&self, run_id: Uuid) -> Result<ExecutionState, RuntimeError> {
        let handle = self
            .registry
            .get(run_id)
            .await
            .ok_or(RuntimeError::RunNotFound(run_id))?;
        Ok(handle.snapshot().await)
    }

    /// All runs this controller has seen, newest first.
    pub async fn history(&self) -> Vec<ExecutionState> {
        self.registry.history().await
    }

    /// Verifies the selected source files are readable and counts their
    /// data rows. No records are parsed and nothing is written.
    pub fn preflight(&self, params: &RunParams) -> Result<PreflightReport, RuntimeError> {
        let customer_rows = if params.selects(CUSTOMER_DOMAIN) {
            Some(count_data_rows(&self.config.customer_file)?)
        } else {
            None
        };
        let company_rows = if params.selects(COMPANY_DOMAIN) {
            Some(count_data_rows(&self.config.company_file)?)
        } else {
            None
        };

        let report = PreflightReport {
            customer_rows,
            company_rows,
        };
        info!(
            customers = ?report.customer_rows,
            companies = ?report.company_rows,
            "Pre-flight check passed"
        );
        Ok(report)
    }
}

fn write_report(dir: Option<&std::path::Path>, state: &ExecutionState) {
    if let Some(dir) = dir {
        if let Err(err) = report::write_statistics_report(dir, state) {
            error!(run_id = %state.run_id, error = %err, "Failed to write statistics report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::store::MemoryTable;
    use model::execution::RunStatus;
    use std::io::Write;
    use tempfile::TempDir;

    const CUSTOMER_HEADER: &str =
        "customer_code\tcustomer_name\temail\tphone\taddress\tpostal_code\tcreated_at\tstatus\tgender_code";
    const COMPANY_HEADER: &str =
        "company_code\tcompany_name\trepresentative_name\tindustry_code\temployee_count\tcapital\testablished_date\taddress\tpostal_code\tphone\temail\tstatus";

    fn controller(dir: &TempDir, report_dir: Option<PathBuf>) -> JobController {
        let customer_file = dir.path().join("customers.tsv");
        let company_file = dir.path().join("companies.tsv");

        let mut f = std::fs::File::create(&customer_file).unwrap();
        writeln!(f, "{CUSTOMER_HEADER}").unwrap();
        writeln!(f, "CUST001\t山田太郎\t\t\t\t\t\tACTIVE\t1").unwrap();
        writeln!(f, "CUST002\t鈴木花子\t\t\t\t\t\tINACTIVE\t2").unwrap();

        let mut f = std::fs::File::create(&company_file).unwrap();
        writeln!(f, "{COMPANY_HEADER}").unwrap();
        writeln!(f, "COMP001\tテスト商事\t\t1\t\t\t\t\t\t\t\tACTIVE").unwrap();

        JobController::new(
            FlowConfig {
                customer_file,
                company_file,
            },
            JobStores::new(
                Arc::new(MemoryTable::new()),
                Arc::new(MemoryTable::new()),
            ),
            ProgressBus::new(),
            report_dir,
        )
    }

    #[tokio::test]
    async fn run_to_completion_reports_both_domains() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, None);

        let state = controller
            .run_to_completion(RunParams::default())
            .await
            .unwrap();
        assert_eq!(state.status, RunStatus::Completed);
        assert_eq!(state.total_read(), 3);
        assert_eq!(state.total_written(), 3);
    }

    #[tokio::test]
    async fn completed_run_writes_the_statistics_report() {
        let dir = TempDir::new().unwrap();
        let reports = dir.path().join("reports");
        let controller = controller(&dir, Some(reports.clone()));

        controller
            .run_to_completion(RunParams::default())
            .await
            .unwrap();

        let files: Vec<_> = std::fs::read_dir(&reports).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn status_and_history_track_the_run() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, None);

        let state = controller
            .run_to_completion(RunParams::default())
            .await
            .unwrap();

        let fetched = controller.status(state.run_id).await.unwrap();
        assert_eq!(fetched.status, RunStatus::Completed);
        assert_eq!(controller.history().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_run_id_is_an_error() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, None);

        let id = Uuid::new_v4();
        assert!(matches!(
            controller.status(id).await,
            Err(RuntimeError::RunNotFound(_))
        ));
        assert!(matches!(
            controller.stop(id).await,
            Err(RuntimeError::RunNotFound(_))
        ));
    }

    #[tokio::test]
    async fn stopping_a_finished_run_is_an_error() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, None);

        let state = controller
            .run_to_completion(RunParams::default())
            .await
            .unwrap();
        assert!(matches!(
            controller.stop(state.run_id).await,
            Err(RuntimeError::RunNotActive(_))
        ));
    }

    #[tokio::test]
    async fn preflight_counts_selected_sources() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, None);

        let report = controller.preflight(&RunParams::default()).unwrap();
        assert_eq!(report.customer_rows, Some(2));
        assert_eq!(report.company_rows, Some(1));
        assert_eq!(report.total(), 3);

        let customers_only = RunParams {
            targets: Some("customer".into()),
            ..Default::default()
        };
        let report = controller.preflight(&customers_only).unwrap();
        assert_eq!(report.company_rows, None);
    }

    #[tokio::test]
    async fn preflight_fails_on_a_missing_file() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, None);
        std::fs::remove_file(dir.path().join("customers.tsv")).unwrap();

        assert!(matches!(
            controller.preflight(&RunParams::default()),
            Err(RuntimeError::Source(_))
        ));
    }
}
