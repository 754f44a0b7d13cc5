//! Upload and batch task data structures.
//!
//! Each [`UploadTask`] travels from the shared queue to exactly one worker and
//! back to its batch over the batch's barrier channel. The orchestrator only
//! reads tasks after [`BatchTask::wait`] has collected every outcome.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::error::AddError;
use crate::item::UploadItem;
use crate::types::{BatchCreateResponse, NewMediaItem, NewMediaItemResult, UploadToken};

/// One item plus its upload outcome
#[derive(Debug)]
pub(crate) struct UploadTask {
    /// Batch this task belongs to
    pub(crate) batch: usize,
    /// Position within the batch
    pub(crate) slot: usize,
    pub(crate) item: UploadItem,
    /// Empty until a worker records a successful upload
    pub(crate) token: UploadToken,
    pub(crate) error: Option<AddError>,
}

impl UploadTask {
    pub(crate) fn new(batch: usize, slot: usize, item: UploadItem) -> Self {
        Self {
            batch,
            slot,
            item,
            token: UploadToken::empty(),
            error: None,
        }
    }
}

/// Queue entry: a task plus the handle that releases one count on its batch barrier
#[derive(Debug)]
pub(crate) struct QueuedUpload {
    pub(crate) task: UploadTask,
    pub(crate) barrier: mpsc::Sender<UploadTask>,
}

/// Outcome of the commit call for one batch
#[derive(Debug)]
pub(crate) enum CommitOutcome {
    /// No task produced a token, so no call was made
    Skipped,
    /// The call succeeded; per-token results inside
    Committed(BatchCreateResponse),
    /// The call itself failed
    Failed(String),
}

impl CommitOutcome {
    /// Token -> result map for the committed batch (empty unless committed)
    pub(crate) fn result_map(&self) -> HashMap<&UploadToken, &NewMediaItemResult> {
        match self {
            CommitOutcome::Committed(response) => response
                .new_media_item_results
                .iter()
                .map(|r| (&r.upload_token, r))
                .collect(),
            CommitOutcome::Skipped | CommitOutcome::Failed(_) => HashMap::new(),
        }
    }
}

/// A group of tasks committed together
///
/// The barrier counts down as workers send finished tasks back; it resolves
/// once every task has reported or every sender is gone.
#[derive(Debug)]
pub(crate) struct BatchTask {
    pub(crate) index: usize,
    len: usize,
    barrier: mpsc::Receiver<UploadTask>,
}

impl BatchTask {
    /// Build a batch from `items`, returning it with the queue entries for its tasks
    pub(crate) fn new(index: usize, items: Vec<UploadItem>) -> (Self, Vec<QueuedUpload>) {
        let len = items.len();
        // Capacity equals the task count so a worker never waits to report
        let (tx, rx) = mpsc::channel(len.max(1));
        let queued = items
            .into_iter()
            .enumerate()
            .map(|(slot, item)| QueuedUpload {
                task: UploadTask::new(index, slot, item),
                barrier: tx.clone(),
            })
            .collect();
        (
            Self {
                index,
                len,
                barrier: rx,
            },
            queued,
        )
    }

    /// Number of tasks in the batch
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Block until every task of the batch has an upload outcome
    ///
    /// Slots are returned in batch order. A slot is `None` only if the worker
    /// holding that task stopped without reporting.
    pub(crate) async fn wait(&mut self) -> Vec<Option<UploadTask>> {
        let mut slots: Vec<Option<UploadTask>> = (0..self.len).map(|_| None).collect();
        for _ in 0..self.len {
            let Some(task) = self.barrier.recv().await else {
                break;
            };
            if let Some(slot) = slots.get_mut(task.slot) {
                *slot = Some(task);
            }
        }
        slots
    }
}

/// Split `items` into contiguous chunks of `size`; the last chunk may be shorter
pub(crate) fn split<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(size).collect());
    }
    batches
}

/// Commit entries for every task that holds a token, in batch order
pub(crate) fn to_new_media_items(slots: &[Option<UploadTask>]) -> Vec<NewMediaItem> {
    slots
        .iter()
        .flatten()
        .filter(|task| !task.token.is_empty())
        .map(|task| NewMediaItem::new(task.token.clone(), task.item.name()))
        .collect()
}
