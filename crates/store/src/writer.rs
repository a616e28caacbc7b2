//! Background save writer.
//!
//! Bridges the synchronous game loop with a tokio runtime that performs the
//! file writes. The loop hands over an owned copy of the record, so the live
//! game can keep changing while the write is in flight. Writes are performed
//! in submission order.

use std::sync::Arc;

use polytris_core::SaveRecord;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::save_store::SaveStore;

/// Result of one background save.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub player_name: String,
    /// File name on success.
    pub result: Result<String, StoreError>,
}

/// Running background writer.
pub struct BackgroundSaver {
    rt: Runtime,
    job_tx: Option<mpsc::UnboundedSender<SaveRecord>>,
    done_rx: mpsc::UnboundedReceiver<SaveOutcome>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundSaver {
    /// Start a writer for `store` on its own single-worker runtime.
    pub fn start(store: SaveStore) -> StoreResult<Self> {
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("polytris-saver")
            .enable_all()
            .build()?;

        let (job_tx, mut job_rx) = mpsc::unbounded_channel::<SaveRecord>();
        let (done_tx, done_rx) = mpsc::unbounded_channel::<SaveOutcome>();
        let store = Arc::new(store);

        let worker = rt.spawn(async move {
            while let Some(record) = job_rx.recv().await {
                let player_name = record.player_name.clone();
                let store = Arc::clone(&store);
                let result = tokio::task::spawn_blocking(move || store.save(&record))
                    .await
                    .unwrap_or_else(|e| Err(StoreError::new(format!("save task failed: {e}"))));
                match &result {
                    Ok(file) => info!(player = %player_name, file = %file, "Background save done"),
                    Err(e) => warn!(player = %player_name, error = %e, "Background save failed"),
                }
                let _ = done_tx.send(SaveOutcome {
                    player_name,
                    result,
                });
            }
            debug!("Save writer drained");
        });

        Ok(Self {
            rt,
            job_tx: Some(job_tx),
            done_rx,
            worker: Some(worker),
        })
    }

    /// Queue a record for writing. Returns false once the writer has stopped.
    pub fn submit(&self, record: SaveRecord) -> bool {
        match &self.job_tx {
            Some(tx) => tx.send(record).is_ok(),
            None => false,
        }
    }

    /// Next finished save, if any.
    pub fn try_outcome(&mut self) -> Option<SaveOutcome> {
        self.done_rx.try_recv().ok()
    }

    /// Finish queued writes and stop the worker.
    pub fn shutdown(&mut self) {
        self.job_tx.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = self.rt.block_on(worker) {
                warn!(error = %e, "Save writer ended abnormally");
            }
        }
    }
}

impl Drop for BackgroundSaver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for BackgroundSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundSaver")
            .field("running", &self.worker.is_some())
            .finish()
    }
}
