use model::execution::StepSnapshot;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerCounters {
    read_count: AtomicU64,
    write_count: AtomicU64,
    read_skip_count: AtomicU64,
    process_skip_count: AtomicU64,
    write_skip_count: AtomicU64,
    commit_count: AtomicU64,
    rollback_count: AtomicU64,
}

/// Monotonic per-step counters.
///
/// Updated by the chunk loop, read concurrently by the progress reporter;
/// relaxed atomics keep the reporter from ever blocking the loop.
#[derive(Debug, Clone, Default)]
pub struct StepCounters {
    inner: Arc<InnerCounters>,
}

impl StepCounters {
    pub fn new() -> Self {
        StepCounters {
            inner: Arc::new(InnerCounters::default()),
        }
    }

    pub fn add_read(&self, count: u64) {
        self.inner.read_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_written(&self, count: u64) {
        self.inner.write_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_read_skips(&self, count: u64) {
        self.inner
            .read_skip_count
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_process_skips(&self, count: u64) {
        self.inner
            .process_skip_count
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_write_skips(&self, count: u64) {
        self.inner
            .write_skip_count
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_commit(&self) {
        self.inner.commit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rollback(&self) {
        self.inner.rollback_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(&self) -> u64 {
        self.inner.read_count.load(Ordering::Relaxed)
    }

    pub fn written(&self) -> u64 {
        self.inner.write_count.load(Ordering::Relaxed)
    }

    pub fn total_skips(&self) -> u64 {
        self.inner.read_skip_count.load(Ordering::Relaxed)
            + self.inner.process_skip_count.load(Ordering::Relaxed)
            + self.inner.write_skip_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, domain: &str) -> StepSnapshot {
        StepSnapshot {
            domain: domain.to_string(),
            read_count: self.inner.read_count.load(Ordering::Relaxed),
            write_count: self.inner.write_count.load(Ordering::Relaxed),
            read_skip_count: self.inner.read_skip_count.load(Ordering::Relaxed),
            process_skip_count: self.inner.process_skip_count.load(Ordering::Relaxed),
            write_skip_count: self.inner.write_skip_count.load(Ordering::Relaxed),
            commit_count: self.inner.commit_count.load(Ordering::Relaxed),
            rollback_count: self.inner.rollback_count.load(Ordering::Relaxed),
        }
    }

    /// Zeroes every counter. Invoked between domains within one run.
    pub fn reset(&self) {
        self.inner.read_count.store(0, Ordering::Relaxed);
        self.inner.write_count.store(0, Ordering::Relaxed);
        self.inner.read_skip_count.store(0, Ordering::Relaxed);
        self.inner.process_skip_count.store(0, Ordering::Relaxed);
        self.inner.write_skip_count.store(0, Ordering::Relaxed);
        self.inner.commit_count.store(0, Ordering::Relaxed);
        self.inner.rollback_count.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_sum_across_categories() {
        let counters = StepCounters::new();
        counters.add_read_skips(1);
        counters.add_process_skips(2);
        counters.add_write_skips(3);
        assert_eq!(counters.total_skips(), 6);
    }

    #[test]
    fn reset_zeroes_everything() {
        let counters = StepCounters::new();
        counters.add_read(10);
        counters.add_written(9);
        counters.add_commit();
        counters.reset();

        let snap = counters.snapshot("customer");
        assert_eq!(snap, StepSnapshot {
            domain: "customer".into(),
            ..Default::default()
        });
    }
}
