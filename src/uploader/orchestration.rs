//! Upload orchestration -- batching, pipelined commits, and reconciliation.
//!
//! Phases of one run:
//! 1. Open the completion ledger (failure aborts before any upload)
//! 2. Split items into batches and fill the shared queue, then close it
//! 3. Start the worker pool
//! 4. For each batch in order: wait on its barrier, commit its tokens,
//!    reconcile per-item outcomes, and append successes to the ledger
//! 5. Join the workers and return results in input order

use crate::error::{AddError, Error, Result};
use crate::item::UploadItem;
use crate::ledger::LedgerWriter;
use crate::types::{AddReport, AddResult, CommitTemplate};

use super::Uploader;
use super::batch::{BatchTask, CommitOutcome, UploadTask, split, to_new_media_items};
use super::workers::{WorkerContext, spawn_upload_workers};

/// Reconciled outcome for one task
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Reconciled {
    pub(crate) result: AddResult,
    /// Ledger key to append, if the item was committed
    pub(crate) ledger_entry: Option<Vec<u8>>,
}

/// Combine upload outcomes with the batch commit outcome, in batch order.
///
/// Error precedence: batch-commit error, then upload error, then the
/// per-token status error.
pub(crate) fn reconcile(slots: &[Option<UploadTask>], commit: &CommitOutcome) -> Vec<Reconciled> {
    let results = commit.result_map();

    slots
        .iter()
        .map(|slot| {
            let Some(task) = slot else {
                return Reconciled {
                    result: AddResult::failed(AddError::WorkerLost),
                    ledger_entry: None,
                };
            };

            let entry = (!task.token.is_empty())
                .then(|| results.get(&task.token))
                .flatten();
            let ledger_entry = entry
                .filter(|r| r.status.is_ok())
                .map(|_| task.item.ledger_key());

            let result = if let CommitOutcome::Failed(message) = commit {
                AddResult::failed(AddError::BatchCreate(message.clone()))
            } else if let Some(error) = &task.error {
                AddResult::failed(error.clone())
            } else if task.token.is_empty() {
                AddResult::failed(AddError::Upload("no upload token".to_string()))
            } else {
                match entry {
                    Some(r) if !r.status.is_ok() => AddResult::failed(AddError::Status {
                        code: r.status.code,
                        message: r.status.message.clone(),
                    }),
                    Some(r) => AddResult::ok(r.media_item.clone()),
                    None => AddResult::failed(AddError::MissingResult),
                }
            };

            Reconciled {
                result,
                ledger_entry,
            }
        })
        .collect()
}

impl Uploader {
    /// Upload `items` and commit them in batches using `template`.
    ///
    /// Per-item failures are reported in the returned [`AddReport`]; only a
    /// ledger that cannot be opened aborts the run. Results are in input order.
    pub async fn add(&self, items: Vec<UploadItem>, template: CommitTemplate) -> Result<AddReport> {
        if items.is_empty() {
            return Ok(AddReport::default());
        }

        let ledger_path = crate::utils::expand_home(&self.config.ledger.path)?;
        let writer = LedgerWriter::open(&ledger_path).await?;
        tracing::debug!(path = %writer.path().display(), "opened completion ledger");
        let mut ledger = Some(writer);

        let total = items.len();
        let (queue_tx, queue_rx) = tokio::sync::mpsc::unbounded_channel();
        let mut batches = Vec::new();
        for (index, chunk) in split(items, self.config.upload.batch_size)
            .into_iter()
            .enumerate()
        {
            let (batch, queued) = BatchTask::new(index, chunk);
            for entry in queued {
                queue_tx
                    .send(entry)
                    .map_err(|_| Error::Other("upload queue closed early".to_string()))?;
            }
            batches.push(batch);
        }
        // No further items once workers start
        drop(queue_tx);
        tracing::info!(items = total, batches = batches.len(), "queued items for upload");

        let mut workers = spawn_upload_workers(
            WorkerContext {
                api: self.api.clone(),
                gate: self.gate.clone(),
                upload_timeout: self.config.upload.upload_timeout,
            },
            queue_rx,
            self.config.upload.concurrency,
        );

        let mut report = AddReport {
            results: Vec::with_capacity(total),
            ..Default::default()
        };

        for batch in &mut batches {
            let slots = batch.wait().await;
            let commit = self.commit_batch(batch, &slots, &template).await;

            for reconciled in reconcile(&slots, &commit) {
                if let Some(key) = reconciled.ledger_entry {
                    record_completion(&mut ledger, &mut report, key).await;
                }
                report.results.push(reconciled.result);
            }
        }
        drop(ledger);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "upload worker panicked");
            }
        }

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "upload run finished"
        );
        Ok(report)
    }

    /// Issue the commit call for one batch, or skip it when no token exists
    async fn commit_batch(
        &self,
        batch: &BatchTask,
        slots: &[Option<UploadTask>],
        template: &CommitTemplate,
    ) -> CommitOutcome {
        let new_media_items = to_new_media_items(slots);
        if new_media_items.is_empty() {
            tracing::warn!(
                batch = batch.index,
                items = batch.len(),
                "no item of the batch was uploaded, skipping commit"
            );
            return CommitOutcome::Skipped;
        }

        tracing::info!(
            batch = batch.index,
            items = new_media_items.len(),
            "adding items"
        );
        let request = template.request(new_media_items);
        match self.api.batch_create_media_items(&request).await {
            Ok(response) => CommitOutcome::Committed(response),
            Err(e) => {
                tracing::warn!(batch = batch.index, error = %e, "batch create failed");
                CommitOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Append a committed item's key to the ledger.
///
/// After the first write failure the ledger is closed and every later
/// item is reported as unrecorded instead.
async fn record_completion(
    ledger: &mut Option<LedgerWriter>,
    report: &mut AddReport,
    key: Vec<u8>,
) {
    let identifier = String::from_utf8_lossy(&key).into_owned();
    let Some(writer) = ledger.as_mut() else {
        report.unrecorded.push(identifier);
        return;
    };
    match writer.append(&key).await {
        Ok(()) => {
            tracing::debug!(identifier = %identifier, "recorded completion");
        }
        Err(e) => {
            tracing::error!(
                identifier = %identifier,
                error = %e,
                "failed to write completion ledger, later successes will not be recorded"
            );
            report.ledger_error = Some(e);
            report.unrecorded.push(identifier);
            *ledger = None;
        }
    }
}
