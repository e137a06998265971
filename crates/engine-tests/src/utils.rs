use async_trait::async_trait;
use connectors::store::{MemoryTable, StoreError, TargetTable};
use engine_runtime::flow::FlowConfig;
use model::params::WriteMode;
use model::records::TargetRow;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

pub const CUSTOMER_HEADER: &str =
    "customer_code\tcustomer_name\temail\tphone\taddress\tpostal_code\tcreated_at\tstatus\tgender_code";
pub const COMPANY_HEADER: &str =
    "company_code\tcompany_name\trepresentative_name\tindustry_code\temployee_count\tcapital\testablished_date\taddress\tpostal_code\tphone\temail\tstatus";

pub fn write_tsv(path: &Path, header: &str, lines: &[&str]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{header}").unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

/// Writes both source files into `dir` and returns the flow config.
pub fn source_files(dir: &Path, customer_lines: &[&str], company_lines: &[&str]) -> FlowConfig {
    let customer_file = dir.join("customers.tsv");
    let company_file = dir.join("companies.tsv");
    write_tsv(&customer_file, CUSTOMER_HEADER, customer_lines);
    write_tsv(&company_file, COMPANY_HEADER, company_lines);
    FlowConfig {
        customer_file,
        company_file,
    }
}

/// Polls until `check` passes or the timeout expires.
pub async fn wait_until<F>(mut check: F, what: &str)
where
    F: FnMut() -> bool,
{
    for _ in 0..500 {
        if check() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

/// In-memory table whose writes block until released.
///
/// Lets a test hold a run mid-chunk: each `write_chunk` consumes one permit,
/// so a run against a zero-permit gate parks at its first write.
pub struct GatedTable<R: TargetRow> {
    inner: MemoryTable<R>,
    permits: Arc<Semaphore>,
    attempts: Arc<AtomicUsize>,
}

impl<R: TargetRow> GatedTable<R> {
    pub fn new() -> Self {
        GatedTable {
            inner: MemoryTable::new(),
            permits: Arc::new(Semaphore::new(0)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Lets `n` more chunk writes proceed.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    /// How many chunk writes have started (including blocked ones).
    pub fn write_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn row_count(&self) -> u64 {
        self.inner.count().await.unwrap()
    }
}

impl<R: TargetRow> Default for GatedTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: TargetRow> TargetTable<R> for GatedTable<R> {
    async fn find_by_key(&self, key: &str) -> Result<Option<R>, StoreError> {
        self.inner.find_by_key(key).await
    }

    async fn write_chunk(&self, rows: &[R], mode: WriteMode) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| StoreError::Internal("gate closed".into()))?;
        permit.forget();
        self.inner.write_chunk(rows, mode).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.inner.count().await
    }
}
