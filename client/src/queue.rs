/// Background queue for fire-and-forget remote upserts.
///
/// The repository enqueues from its synchronous write path; a single tokio task
/// drains the queue in submission order. Callers never see a future for a job.

use crate::cloud::CloudSync;
use crate::models::Collection;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum SyncJob {
    Upsert { table: Collection, row: Value },
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the upsert worker. Cloning shares the same worker.
#[derive(Clone)]
pub struct SyncQueue {
    tx: mpsc::UnboundedSender<SyncJob>,
}

impl SyncQueue {
    /// Start the worker task. Must be called from within a tokio runtime.
    pub fn spawn(cloud: Arc<CloudSync>) -> (SyncQueue, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<SyncJob>();

        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    SyncJob::Upsert { table, row } => {
                        cloud.upsert(table, &row).await;
                    }
                    SyncJob::Flush(ack) => {
                        let _ = ack.send(());
                    }
                    SyncJob::Shutdown(ack) => {
                        let _ = ack.send(());
                        break;
                    }
                }
            }
            log::debug!("Sync queue worker stopped");
        });

        (SyncQueue { tx }, handle)
    }

    /// Queue an upsert; returns immediately
    pub fn enqueue_upsert(&self, table: Collection, row: Value) {
        if self.tx.send(SyncJob::Upsert { table, row }).is_err() {
            log::warn!("Sync queue closed; dropping upsert for {}", table);
        }
    }

    /// Wait until every job queued before this call has been processed
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(SyncJob::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Drain pending jobs, then stop the worker. Later enqueues are dropped.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(SyncJob::Shutdown(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
