use crate::{bus::ProgressBus, counters::StepCounters};
use chrono::Utc;
use model::progress::ProgressMessage;
use std::{sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct TrackerInner {
    domain: String,
    started_at: Instant,
}

/// Accumulates read/write/skip counters for the current domain and turns
/// them into progress snapshots with throughput and elapsed time.
///
/// The chunk loop updates the counters; the periodic reporter task reads
/// them without ever waiting on the loop.
#[derive(Clone)]
pub struct ProgressTracker {
    run_id: Uuid,
    counters: StepCounters,
    bus: ProgressBus,
    inner: Arc<RwLock<TrackerInner>>,
}

impl ProgressTracker {
    pub fn new(run_id: Uuid, bus: ProgressBus) -> Self {
        ProgressTracker {
            run_id,
            counters: StepCounters::new(),
            bus,
            inner: Arc::new(RwLock::new(TrackerInner {
                domain: String::new(),
                started_at: Instant::now(),
            })),
        }
    }

    /// Shared handle to the counters the step increments.
    pub fn counters(&self) -> StepCounters {
        self.counters.clone()
    }

    /// Resets counters and the clock for the next domain and announces it.
    /// Invoked once per domain, including the first.
    pub async fn begin_domain(&self, domain: &str) {
        self.counters.reset();
        {
            let mut inner = self.inner.write().await;
            inner.domain = domain.to_string();
            inner.started_at = Instant::now();
        }
        self.publish("STARTED").await;
    }

    pub async fn snapshot(&self, status: &str) -> ProgressMessage {
        let inner = self.inner.read().await;
        let elapsed = inner.started_at.elapsed();
        let elapsed_secs = elapsed.as_secs_f64();

        let read = self.counters.read();
        let written = self.counters.written();
        let skipped = self.counters.total_skips();

        let (read_speed, write_speed) = if elapsed_secs > 0.0 {
            (read as f64 / elapsed_secs, written as f64 / elapsed_secs)
        } else {
            (0.0, 0.0)
        };

        ProgressMessage {
            run_id: self.run_id,
            domain: inner.domain.clone(),
            status: status.to_string(),
            read_count: read,
            write_count: written,
            skip_count: skipped,
            read_speed,
            write_speed,
            elapsed_seconds: elapsed.as_secs(),
            timestamp: Utc::now(),
            message: format!("read: {read}, written: {written}, skipped: {skipped}"),
        }
    }

    pub async fn publish(&self, status: &str) {
        let snapshot = self.snapshot(status).await;
        info!(
            run_id = %snapshot.run_id,
            domain = %snapshot.domain,
            status = %snapshot.status,
            read = snapshot.read_count,
            written = snapshot.write_count,
            skipped = snapshot.skip_count,
            elapsed_s = snapshot.elapsed_seconds,
            "Progress"
        );
        self.bus.publish(snapshot).await;
    }

    /// One-shot report at step completion.
    pub async fn final_report(&self, status: &str) {
        self.publish(status).await;
    }

    /// Spawns the periodic reporter. The first tick fires immediately
    /// (one snapshot at step start), then every `period` until cancelled.
    /// Emission is independent of chunk boundaries.
    pub fn spawn_reporter(&self, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => tracker.publish("IN_PROGRESS").await,
                }
            }
        })
    }
}
