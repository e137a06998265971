use clap::Parser;
use commands::Commands;
use connectors::store::MemoryTable;
use engine_core::bus::ProgressBus;
use engine_runtime::control::JobController;
use engine_runtime::flow::{FlowConfig, JobStores};
use model::execution::{ExecutionState, RunStatus};
use model::params::{MaskingConfig, RunParams, WriteMode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

pub mod commands;

#[derive(Parser)]
#[command(name = "migrator", version = "0.1.0", about = "Legacy data migration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            customer_file,
            company_file,
            store,
            targets,
            upsert,
            mask,
            chunk_size,
            skip_limit,
            report_dir,
        } => {
            let params = RunParams {
                targets,
                write_mode: if upsert {
                    WriteMode::Upsert
                } else {
                    WriteMode::Append
                },
                masking: if mask {
                    MaskingConfig::enabled()
                } else {
                    MaskingConfig::default()
                },
                chunk_size,
                skip_limit,
            };

            let config = FlowConfig {
                customer_file,
                company_file,
            };
            let db = sled::open(&store)?;
            let stores = JobStores::open_sled(&db)?;
            let state = run_migration(config, stores, params, report_dir).await?;

            if state.status != RunStatus::Completed {
                std::process::exit(1);
            }
        }

        Commands::Preflight {
            customer_file,
            company_file,
            targets,
        } => {
            let params = RunParams {
                targets,
                ..Default::default()
            };
            let config = FlowConfig {
                customer_file,
                company_file,
            };
            // Pre-flight only reads the source files; no store is touched.
            let stores = JobStores::new(
                Arc::new(MemoryTable::new()),
                Arc::new(MemoryTable::new()),
            );
            let controller = JobController::new(config, stores, ProgressBus::new(), None);

            let report = controller.preflight(&params)?;
            if let Some(rows) = report.customer_rows {
                println!("customers: {rows} rows");
            }
            if let Some(rows) = report.company_rows {
                println!("companies: {rows} rows");
            }
            println!("total: {} rows", report.total());
        }
    }

    Ok(())
}

async fn run_migration(
    config: FlowConfig,
    stores: JobStores,
    params: RunParams,
    report_dir: Option<PathBuf>,
) -> Result<ExecutionState, Box<dyn std::error::Error>> {
    let bus = ProgressBus::new();
    let controller = Arc::new(JobController::new(config, stores, bus.clone(), report_dir));

    let mut progress = bus.subscribe(64).await;
    let printer = tokio::spawn(async move {
        while let Some(msg) = progress.recv().await {
            println!(
                "[{}] {} read={} written={} skipped={} elapsed={}s ({:.1} rows/s)",
                msg.domain,
                msg.status,
                msg.read_count,
                msg.write_count,
                msg.skip_count,
                msg.elapsed_seconds,
                msg.write_speed,
            );
        }
    });

    let run_id = controller.start(params).await?;
    println!("run {run_id} started");

    // Ctrl-C requests a graceful stop; the run ends at a chunk boundary.
    let stopper = {
        let controller = controller.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("stop requested, finishing the current chunk...");
                let _ = controller.stop(run_id).await;
            }
        })
    };

    let state = loop {
        let state = controller.status(run_id).await?;
        if state.status.is_terminal() {
            break state;
        }
        sleep(Duration::from_millis(200)).await;
    };

    stopper.abort();
    printer.abort();

    println!(
        "run {run_id} {}: read={} written={} skipped={}",
        state.status,
        state.total_read(),
        state.total_written(),
        state.total_skipped(),
    );
    if let Some(failure) = &state.first_failure {
        eprintln!("first failure: {failure}");
    }

    Ok(state)
}
