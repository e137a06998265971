use connectors::store::{StoreError, TargetTable};
use engine_core::counters::StepCounters;
use engine_core::error::classify_store_error;
use engine_core::retry::{RetryError, RetryPolicy};
use model::params::WriteMode;
use model::records::TargetRow;
use std::sync::Arc;
use tracing::{error, warn};

/// Writes transformed chunks with bounded retry.
///
/// Transient store errors are retried under the policy; a chunk that still
/// fails after the last attempt, or fails permanently on the first, is
/// skipped as a whole and counted against the skip limit. Anything else
/// aborts the step.
pub struct ChunkWriter<R: TargetRow> {
    table: Arc<dyn TargetTable<R>>,
    policy: RetryPolicy,
    mode: WriteMode,
}

impl<R: TargetRow> ChunkWriter<R> {
    pub fn new(table: Arc<dyn TargetTable<R>>, mode: WriteMode) -> Self {
        Self::with_policy(table, mode, RetryPolicy::default())
    }

    pub fn with_policy(table: Arc<dyn TargetTable<R>>, mode: WriteMode, policy: RetryPolicy) -> Self {
        ChunkWriter {
            table,
            policy,
            mode,
        }
    }

    /// Writes one chunk, updating the step counters. Returns how many rows
    /// were skipped (0 or the whole chunk).
    pub async fn write(&self, rows: &[R], counters: &StepCounters) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let outcome = self
            .policy
            .run(
                || self.table.write_chunk(rows, self.mode),
                classify_store_error,
            )
            .await;

        match outcome {
            Ok(()) => {
                counters.add_written(rows.len() as u64);
                counters.add_commit();
                Ok(0)
            }
            Err(RetryError::AttemptsExceeded(err)) => {
                warn!(
                    rows = rows.len(),
                    error = %err,
                    "Chunk write exhausted retries, skipping chunk"
                );
                counters.add_write_skips(rows.len() as u64);
                counters.add_rollback();
                Ok(rows.len() as u64)
            }
            Err(RetryError::Final(err)) if err.is_permanent() => {
                warn!(
                    rows = rows.len(),
                    error = %err,
                    "Chunk write failed permanently, skipping chunk"
                );
                counters.add_write_skips(rows.len() as u64);
                counters.add_rollback();
                Ok(rows.len() as u64)
            }
            Err(RetryError::Final(err)) => {
                error!(rows = rows.len(), error = %err, "Chunk write failed fatally");
                counters.add_rollback();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use connectors::store::MemoryTable;
    use model::records::CustomerRow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn row(key: &str) -> CustomerRow {
        CustomerRow {
            id: None,
            customer_id: key.into(),
            full_name: "山田太郎".into(),
            email_address: None,
            phone_number: None,
            full_address: None,
            zip_code: None,
            registration_date: None,
            is_active: true,
            migrated_at: Utc::now(),
            gender: None,
            source_id: None,
        }
    }

    /// Fails with the given error the first `failures` times, then delegates.
    struct FlakyTable {
        inner: MemoryTable<CustomerRow>,
        failures: AtomicUsize,
        error: fn() -> StoreError,
    }

    impl FlakyTable {
        fn new(failures: usize, error: fn() -> StoreError) -> Self {
            FlakyTable {
                inner: MemoryTable::new(),
                failures: AtomicUsize::new(failures),
                error,
            }
        }
    }

    #[async_trait]
    impl TargetTable<CustomerRow> for FlakyTable {
        async fn find_by_key(&self, key: &str) -> Result<Option<CustomerRow>, StoreError> {
            self.inner.find_by_key(key).await
        }

        async fn write_chunk(
            &self,
            rows: &[CustomerRow],
            mode: WriteMode,
        ) -> Result<(), StoreError> {
            if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            }).is_ok() {
                return Err((self.error)());
            }
            self.inner.write_chunk(rows, mode).await
        }

        async fn count(&self) -> Result<u64, StoreError> {
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn successful_chunk_counts_writes_and_a_commit() {
        let table = Arc::new(MemoryTable::new());
        let writer = ChunkWriter::new(table, WriteMode::Append);
        let counters = StepCounters::new();

        let skipped = writer
            .write(&[row("CUST001"), row("CUST002")], &counters)
            .await
            .unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(counters.written(), 2);
        assert_eq!(counters.snapshot("customer").commit_count, 1);
    }

    #[tokio::test]
    async fn transient_failure_is_retried_to_success() {
        let table = Arc::new(FlakyTable::new(2, || StoreError::Busy("locked".into())));
        let writer =
            ChunkWriter::with_policy(table, WriteMode::Append, RetryPolicy::immediate(3));
        let counters = StepCounters::new();

        let skipped = writer.write(&[row("CUST001")], &counters).await.unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(counters.written(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_skip_the_chunk() {
        let table = Arc::new(FlakyTable::new(3, || StoreError::Busy("locked".into())));
        let writer =
            ChunkWriter::with_policy(table, WriteMode::Append, RetryPolicy::immediate(3));
        let counters = StepCounters::new();

        let skipped = writer
            .write(&[row("CUST001"), row("CUST002")], &counters)
            .await
            .unwrap();
        assert_eq!(skipped, 2);
        assert_eq!(counters.written(), 0);
        assert_eq!(counters.total_skips(), 2);
        assert_eq!(counters.snapshot("customer").rollback_count, 1);
    }

    #[tokio::test]
    async fn permanent_failure_skips_without_retrying() {
        let table = Arc::new(FlakyTable::new(usize::MAX, || StoreError::UniqueViolation {
            key: "CUST001".into(),
        }));
        let writer =
            ChunkWriter::with_policy(table, WriteMode::Append, RetryPolicy::immediate(3));
        let counters = StepCounters::new();

        let skipped = writer.write(&[row("CUST001")], &counters).await.unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(counters.total_skips(), 1);
    }

    #[tokio::test]
    async fn fatal_failure_aborts_the_step() {
        let table = Arc::new(FlakyTable::new(usize::MAX, || {
            StoreError::Internal("corrupt".into())
        }));
        let writer =
            ChunkWriter::with_policy(table, WriteMode::Append, RetryPolicy::immediate(3));
        let counters = StepCounters::new();

        let result = writer.write(&[row("CUST001")], &counters).await;
        assert!(matches!(result, Err(StoreError::Internal(_))));
        assert_eq!(counters.total_skips(), 0);
    }
}
