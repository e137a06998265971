use model::progress::ProgressMessage;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

/// Pub-sub channel for progress snapshots.
///
/// Subscribers get a bounded channel; publishing never blocks the chunk
/// loop, so a slow subscriber drops messages instead of applying
/// backpressure.
#[derive(Clone, Default)]
pub struct ProgressBus {
    subscribers: Arc<RwLock<Vec<mpsc::Sender<Arc<ProgressMessage>>>>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        ProgressBus {
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Arc<ProgressMessage>> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.subscribers.write().await.push(tx);
        rx
    }

    pub async fn publish(&self, message: ProgressMessage) {
        let message = Arc::new(message);
        let mut subscribers = self.subscribers.write().await;

        // Closed receivers are pruned as we go.
        subscribers.retain(|tx| match tx.try_send(message.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    run_id = %message.run_id,
                    domain = %message.domain,
                    "Dropped progress snapshot for slow subscriber"
                );
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Removing closed progress subscriber");
                false
            }
        });
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}
