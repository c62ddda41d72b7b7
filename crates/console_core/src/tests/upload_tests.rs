use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::domain::{IssueId, Page, PageId};
use tokio::sync::{oneshot, Mutex};

use crate::collection::CollectionController;
use crate::error::StoreError;
use crate::store::{CollectionStore, UploadStore};
use crate::upload::{BatchProgress, FilePayload, UploadEvent, UploadOutcome, UploadPipeline};

fn payload(name: &str) -> FilePayload {
    FilePayload {
        filename: name.to_string(),
        mime_type: Some("image/png".to_string()),
        bytes: vec![0u8; 16],
    }
}

fn page(id: i64, number: i32) -> Page {
    Page {
        id: Some(PageId(id)),
        issue_id: IssueId(1),
        page_number: number,
        image_url: format!("https://cdn.example/p{id}.png"),
        thumbnail_url: None,
        optimized_url: None,
    }
}

struct TestUploadStore {
    uploaded: Arc<Mutex<Vec<String>>>,
    fail_on: HashSet<usize>,
    list_results: Mutex<VecDeque<Result<Vec<Page>, StoreError>>>,
    list_calls: Arc<Mutex<u32>>,
    upload_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl TestUploadStore {
    fn new() -> Self {
        Self {
            uploaded: Arc::new(Mutex::new(Vec::new())),
            fail_on: HashSet::new(),
            list_results: Mutex::new(VecDeque::new()),
            list_calls: Arc::new(Mutex::new(0)),
            upload_gate: Mutex::new(None),
        }
    }

    fn failing_on(mut self, index: usize) -> Self {
        self.fail_on.insert(index);
        self
    }

    async fn script_list(&self, result: Result<Vec<Page>, StoreError>) {
        self.list_results.lock().await.push_back(result);
    }

    async fn gate_next_upload(&self, gate: oneshot::Receiver<()>) {
        *self.upload_gate.lock().await = Some(gate);
    }
}

#[async_trait]
impl CollectionStore for TestUploadStore {
    type Item = Page;

    async fn list(&self) -> Result<Vec<Page>, StoreError> {
        *self.list_calls.lock().await += 1;
        self.list_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn reorder(&self, _ordered_ids: &[i64]) -> Result<Vec<Page>, StoreError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl UploadStore for TestUploadStore {
    async fn upload(&self, file: &FilePayload) -> Result<Page, StoreError> {
        let gate = self.upload_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let index = {
            let mut uploaded = self.uploaded.lock().await;
            uploaded.push(file.filename.clone());
            uploaded.len() - 1
        };
        if self.fail_on.contains(&index) {
            return Err(StoreError::Status {
                status: 500,
                body: "rejected".to_string(),
            });
        }
        Ok(page(index as i64 + 1, index as i32 + 1))
    }
}

fn pipeline(store: Arc<TestUploadStore>) -> Arc<UploadPipeline<TestUploadStore>> {
    let collection = CollectionController::new(store.clone());
    UploadPipeline::new(store, collection)
}

#[test]
fn progress_percent_is_position_based_and_rounded() {
    let progress = |cursor| BatchProgress {
        cursor,
        total: 3,
        outcomes: vec![UploadOutcome::Pending; 3],
    };
    assert_eq!(progress(1).percent(), 33);
    assert_eq!(progress(2).percent(), 67);
    assert_eq!(progress(3).percent(), 100);

    let idle = BatchProgress {
        cursor: 0,
        total: 0,
        outcomes: Vec::new(),
    };
    assert_eq!(idle.percent(), 0);
}

#[tokio::test]
async fn batch_uploads_sequentially_and_reloads_once() {
    let store = Arc::new(TestUploadStore::new());
    let uploaded = store.uploaded.clone();
    let list_calls = store.list_calls.clone();
    let pipeline = pipeline(store);

    let report = pipeline
        .start_batch(vec![payload("p1.png"), payload("p2.png"), payload("p3.png")])
        .await
        .expect("batch runs");

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.outcomes, vec![UploadOutcome::Succeeded; 3]);
    let uploaded = uploaded.lock().await.clone();
    assert_eq!(uploaded, vec!["p1.png", "p2.png", "p3.png"]);
    assert_eq!(*list_calls.lock().await, 1);

    let progress = pipeline.progress().await;
    assert_eq!(progress.cursor, 3);
    assert_eq!(progress.percent(), 100);
    assert!(!pipeline.is_uploading().await);
}

#[tokio::test]
async fn failed_file_does_not_halt_the_batch() {
    let store = Arc::new(TestUploadStore::new().failing_on(1));
    let uploaded = store.uploaded.clone();
    let list_calls = store.list_calls.clone();
    let pipeline = pipeline(store);
    let mut rx = pipeline.subscribe_events();

    let report = pipeline
        .start_batch(vec![payload("p1.png"), payload("p2.png"), payload("p3.png")])
        .await
        .expect("batch runs");

    assert_eq!(
        report.outcomes,
        vec![
            UploadOutcome::Succeeded,
            UploadOutcome::Failed,
            UploadOutcome::Succeeded,
        ]
    );
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    // All three were attempted and the reload still happened.
    assert_eq!(uploaded.lock().await.len(), 3);
    assert_eq!(*list_calls.lock().await, 1);

    let mut saw_failure = false;
    let mut saw_finish = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            UploadEvent::FileFailed { index, .. } => {
                assert_eq!(index, 1);
                saw_failure = true;
            }
            UploadEvent::BatchFinished { succeeded, failed } => {
                assert_eq!((succeeded, failed), (2, 1));
                saw_finish = true;
            }
            _ => {}
        }
    }
    assert!(saw_failure);
    assert!(saw_finish);
}

#[tokio::test]
async fn empty_selection_is_a_noop() {
    let store = Arc::new(TestUploadStore::new());
    let uploaded = store.uploaded.clone();
    let list_calls = store.list_calls.clone();
    let pipeline = pipeline(store);

    assert!(pipeline.start_batch(Vec::new()).await.is_none());

    let progress = pipeline.progress().await;
    assert_eq!((progress.cursor, progress.total), (0, 0));
    assert!(uploaded.lock().await.is_empty());
    assert_eq!(*list_calls.lock().await, 0);
}

#[tokio::test]
async fn second_batch_is_rejected_while_one_is_running() {
    let store = Arc::new(TestUploadStore::new());
    let uploaded = store.uploaded.clone();
    let (release, gate) = oneshot::channel();
    store.gate_next_upload(gate).await;
    let pipeline = pipeline(store);

    let running = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.start_batch(vec![payload("p1.png")]).await })
    };
    while !pipeline.is_uploading().await {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    assert!(pipeline.start_batch(vec![payload("late.png")]).await.is_none());

    release.send(()).expect("release upload");
    let report = running.await.expect("join").expect("batch runs");
    assert_eq!(report.succeeded, 1);
    assert_eq!(uploaded.lock().await.clone(), vec!["p1.png"]);
}
