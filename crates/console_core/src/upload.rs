use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::collection::CollectionController;
use crate::store::UploadStore;

/// A file selected for upload. Bytes are held in memory for the life of the
/// batch; batches are user-selected image sets, not bulk transfers.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Pending,
    Succeeded,
    Failed,
}

/// Position-based progress of the current batch. `percent` reflects files
/// completed, not bytes transferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Index of the file currently (or next) being uploaded, 1-based once a
    /// batch is running; 0 when idle.
    pub cursor: usize,
    pub total: usize,
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchProgress {
    fn idle() -> Self {
        Self {
            cursor: 0,
            total: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.cursor as f64 / self.total as f64) * 100.0).round() as u8
    }
}

/// Aggregate result surfaced to the user at batch end. May mix succeeded and
/// failed files; failed ones are not retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<UploadOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    FileStarted { index: usize, total: usize },
    FileSucceeded { index: usize },
    FileFailed { index: usize, message: String },
    BatchFinished { succeeded: usize, failed: usize },
}

struct PipelineState {
    uploading: bool,
    progress: BatchProgress,
}

/// Uploads a fixed batch of files strictly sequentially against one parent
/// collection: upload `i + 1` is issued only after upload `i`'s response is
/// observed. A failing file is recorded and the batch continues. When the
/// batch ends, the parent collection is reloaded once; the server assigns
/// the new items' ranks.
pub struct UploadPipeline<S: UploadStore> {
    store: Arc<S>,
    collection: Arc<CollectionController<S>>,
    inner: Mutex<PipelineState>,
    events: broadcast::Sender<UploadEvent>,
}

impl<S: UploadStore> UploadPipeline<S> {
    pub fn new(store: Arc<S>, collection: Arc<CollectionController<S>>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            store,
            collection,
            inner: Mutex::new(PipelineState {
                uploading: false,
                progress: BatchProgress::idle(),
            }),
            events,
        })
    }

    /// Runs one batch to completion and returns its aggregate report.
    ///
    /// Returns `None` without any remote call when the selection is empty or
    /// another batch is still running on this pipeline.
    pub async fn start_batch(&self, files: Vec<FilePayload>) -> Option<BatchReport> {
        if files.is_empty() {
            return None;
        }
        let total = files.len();
        {
            let mut state = self.inner.lock().await;
            if state.uploading {
                warn!(total, "batch rejected: upload already running");
                return None;
            }
            state.uploading = true;
            state.progress = BatchProgress {
                cursor: 0,
                total,
                outcomes: vec![UploadOutcome::Pending; total],
            };
        }

        for (index, file) in files.iter().enumerate() {
            {
                let mut state = self.inner.lock().await;
                state.progress.cursor = index + 1;
            }
            let _ = self.events.send(UploadEvent::FileStarted {
                index,
                total,
            });

            match self.store.upload(file).await {
                Ok(_) => {
                    self.inner.lock().await.progress.outcomes[index] = UploadOutcome::Succeeded;
                    let _ = self.events.send(UploadEvent::FileSucceeded { index });
                }
                Err(err) => {
                    // Continue-on-error: one bad file must not block the rest.
                    warn!(index, filename = %file.filename, "upload failed: {err}");
                    self.inner.lock().await.progress.outcomes[index] = UploadOutcome::Failed;
                    let _ = self.events.send(UploadEvent::FileFailed {
                        index,
                        message: err.to_string(),
                    });
                }
            }
        }

        let report = {
            let mut state = self.inner.lock().await;
            state.uploading = false;
            let outcomes = state.progress.outcomes.clone();
            let succeeded = outcomes
                .iter()
                .filter(|o| **o == UploadOutcome::Succeeded)
                .count();
            BatchReport {
                total,
                succeeded,
                failed: total - succeeded,
                outcomes,
            }
        };

        // The newly created items' ranks are authoritative only from the
        // server; refresh the parent collection exactly once per batch.
        self.collection.load().await;
        info!(
            total,
            succeeded = report.succeeded,
            failed = report.failed,
            "upload batch finished"
        );
        let _ = self.events.send(UploadEvent::BatchFinished {
            succeeded: report.succeeded,
            failed: report.failed,
        });

        Some(report)
    }

    pub async fn is_uploading(&self) -> bool {
        self.inner.lock().await.uploading
    }

    /// Snapshot of the current batch's progress.
    pub async fn progress(&self) -> BatchProgress {
        self.inner.lock().await.progress.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }
}
