use chrono::Local;
use model::execution::ExecutionState;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the end-of-run statistics report as a three-column CSV
/// (section, item, value), one file per run under `dir`.
///
/// File name format: `batch-stats-YYYYmmdd-HHMMSS.csv`.
pub fn write_statistics_report(dir: &Path, state: &ExecutionState) -> Result<PathBuf, csv::Error> {
    std::fs::create_dir_all(dir).map_err(csv::Error::from)?;

    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("batch-stats-{timestamp}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;

    writer.write_record(["section", "item", "value"])?;

    writer.write_record(["job", "run_id", &state.run_id.to_string()])?;
    writer.write_record(["job", "job_name", &state.job_name])?;
    writer.write_record(["job", "status", state.status.as_str()])?;
    if let Some(failure) = &state.first_failure {
        writer.write_record(["job", "first_failure", failure])?;
    }

    let started = state.started_at.format("%Y-%m-%d %H:%M:%S").to_string();
    writer.write_record(["timing", "started_at", &started])?;
    let ended = state
        .ended_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    writer.write_record(["timing", "ended_at", &ended])?;

    let duration_seconds = state
        .ended_at
        .map(|end| (end - state.started_at).num_seconds().max(0))
        .unwrap_or(0);
    writer.write_record(["timing", "duration_seconds", &duration_seconds.to_string()])?;

    for (index, step) in state.steps.iter().enumerate() {
        let section = format!("step{}({})", index + 1, step.domain);
        writer.write_record([&section, "read_count", &step.read_count.to_string()])?;
        writer.write_record([&section, "write_count", &step.write_count.to_string()])?;
        writer.write_record([
            &section,
            "read_skip_count",
            &step.read_skip_count.to_string(),
        ])?;
        writer.write_record([
            &section,
            "process_skip_count",
            &step.process_skip_count.to_string(),
        ])?;
        writer.write_record([
            &section,
            "write_skip_count",
            &step.write_skip_count.to_string(),
        ])?;
        writer.write_record([&section, "skip_total", &step.total_skips().to_string()])?;
        writer.write_record([&section, "commit_count", &step.commit_count.to_string()])?;
        writer.write_record([
            &section,
            "rollback_count",
            &step.rollback_count.to_string(),
        ])?;
    }

    let total_read = state.total_read();
    let total_written = state.total_written();
    let total_skipped = state.total_skipped();
    writer.write_record(["summary", "total_read", &total_read.to_string()])?;
    writer.write_record(["summary", "total_written", &total_written.to_string()])?;
    writer.write_record(["summary", "total_skipped", &total_skipped.to_string()])?;

    let overall_speed = if duration_seconds > 0 {
        total_written as f64 / duration_seconds as f64
    } else {
        0.0
    };
    writer.write_record(["summary", "rows_per_second", &format!("{overall_speed:.2}")])?;

    if total_read > 0 {
        let success_rate = (total_read - total_skipped) as f64 / total_read as f64 * 100.0;
        writer.write_record(["summary", "success_rate_pct", &format!("{success_rate:.2}")])?;
    }

    writer.flush().map_err(csv::Error::from)?;
    info!(path = %path.display(), "Statistics report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use model::execution::{RunStatus, StepSnapshot};
    use model::params::RunParams;

    #[test]
    fn report_contains_job_steps_and_summary() {
        let mut state = ExecutionState::new("legacy-migration", RunParams::default());
        state.status = RunStatus::Completed;
        state.ended_at = Some(Utc::now());
        state.steps.push(StepSnapshot {
            domain: "customer".into(),
            read_count: 10,
            write_count: 8,
            process_skip_count: 2,
            commit_count: 1,
            ..Default::default()
        });

        let dir = tempfile::tempdir().unwrap();
        let path = write_statistics_report(dir.path(), &state).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("job,status,COMPLETED"));
        assert!(contents.contains("step1(customer),read_count,10"));
        assert!(contents.contains("summary,total_written,8"));
        assert!(contents.contains("summary,success_rate_pct,80.00"));
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("batch-stats-")
        );
    }
}
