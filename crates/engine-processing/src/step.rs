use crate::transform::RecordTransformer;
use crate::transform::mask::{DataMasker, MaskTarget};
use crate::validate::RecordValidator;
use crate::writer::ChunkWriter;
use connectors::tsv::{FromTsvRow, TsvSource};
use engine_core::counters::StepCounters;
use engine_core::error::{ErrorClass, StepError};
use model::execution::StepSnapshot;
use model::params::RunParams;
use model::records::{SourceRecord, TargetRow};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How a step ended when it did not abort with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    /// A stop was requested; the in-flight chunk finished, the rest of the
    /// file was left unread.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub status: StepStatus,
    pub snapshot: StepSnapshot,
    /// First skip or failure message observed, for the run summary.
    pub first_failure: Option<String>,
}

/// One domain's extract-validate-transform-load loop.
///
/// Records flow through in chunks: fetch, per-record validate and transform,
/// mask, then one atomic chunk write. Every skip source (unreadable line,
/// rule violation, failed write) feeds the same skip budget; crossing
/// `skip_limit` fails the step.
///
/// Retry is write-scoped: only the chunk write goes through the retry
/// policy. A transient error from the upsert lookup during transform skips
/// that record; the natural key comes around again on the next run.
pub struct MigrationStep<S, T>
where
    S: SourceRecord + FromTsvRow,
    T: TargetRow + MaskTarget,
{
    domain: String,
    validator: Arc<dyn RecordValidator<S>>,
    transformer: Arc<dyn RecordTransformer<S, T>>,
    writer: ChunkWriter<T>,
    masker: DataMasker,
    params: RunParams,
}

impl<S, T> MigrationStep<S, T>
where
    S: SourceRecord + FromTsvRow,
    T: TargetRow + MaskTarget,
{
    pub fn new(
        domain: &str,
        validator: Arc<dyn RecordValidator<S>>,
        transformer: Arc<dyn RecordTransformer<S, T>>,
        writer: ChunkWriter<T>,
        masker: DataMasker,
        params: RunParams,
    ) -> Self {
        MigrationStep {
            domain: domain.to_string(),
            validator,
            transformer,
            writer,
            masker,
            params,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub async fn run(
        &self,
        source: &mut TsvSource<S>,
        counters: &StepCounters,
        cancel: &CancellationToken,
    ) -> Result<StepOutcome, StepError> {
        let mut first_failure: Option<String> = None;

        loop {
            // Stop requests take effect at chunk boundaries only, so a
            // written chunk is never half-applied.
            if cancel.is_cancelled() {
                info!(domain = %self.domain, "Stop requested, ending step at chunk boundary");
                return Ok(self.outcome(StepStatus::Stopped, counters, first_failure));
            }

            let fetch = source.fetch(self.params.chunk_size)?;
            counters.add_read((fetch.records.len() + fetch.failures.len()) as u64);
            counters.add_read_skips(fetch.failures.len() as u64);
            for failure in &fetch.failures {
                note_first(&mut first_failure, &format!(
                    "line {}: {}",
                    failure.line, failure.message
                ));
            }

            let mut rows = Vec::with_capacity(fetch.records.len());
            for record in &fetch.records {
                if let Err(err) = self.validator.validate(record) {
                    warn!(
                        domain = %self.domain,
                        key = record.natural_key(),
                        %err,
                        "Record rejected by validation"
                    );
                    counters.add_process_skips(1);
                    note_first(&mut first_failure, &err.to_string());
                    continue;
                }

                match self.transformer.transform(record).await {
                    Ok(mut row) => {
                        self.masker.apply(&mut row);
                        rows.push(row);
                    }
                    Err(err) => {
                        let step_err = StepError::Store(err);
                        if step_err.classify() == ErrorClass::Fatal {
                            return Err(step_err);
                        }
                        warn!(
                            domain = %self.domain,
                            key = record.natural_key(),
                            error = %step_err,
                            "Record dropped during transform"
                        );
                        counters.add_process_skips(1);
                        note_first(&mut first_failure, &step_err.to_string());
                    }
                }
            }

            let skipped = self.writer.write(&rows, counters).await?;
            if skipped > 0 {
                note_first(
                    &mut first_failure,
                    &format!("chunk of {skipped} rows skipped at write"),
                );
            }

            let skips = counters.total_skips();
            if skips > self.params.skip_limit {
                return Err(StepError::SkipLimitExceeded {
                    skips,
                    limit: self.params.skip_limit,
                });
            }

            if fetch.reached_end {
                return Ok(self.outcome(StepStatus::Completed, counters, first_failure));
            }
        }
    }

    fn outcome(
        &self,
        status: StepStatus,
        counters: &StepCounters,
        first_failure: Option<String>,
    ) -> StepOutcome {
        let snapshot = counters.snapshot(&self.domain);
        info!(
            domain = %self.domain,
            status = ?status,
            read = snapshot.read_count,
            written = snapshot.write_count,
            skipped = snapshot.total_skips(),
            "Step finished"
        );
        StepOutcome {
            status,
            snapshot,
            first_failure,
        }
    }
}

fn note_first(slot: &mut Option<String>, message: &str) {
    if slot.is_none() {
        *slot = Some(message.to_string());
    }
}
