//! Upload worker pool -- drains the shared queue and turns items into tokens.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;

use crate::availability::NetworkGate;
use crate::error::{AddError, Error};
use crate::photos::PhotosApi;

use super::batch::QueuedUpload;

/// Shared state handed to every worker
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) api: Arc<dyn PhotosApi>,
    pub(crate) gate: NetworkGate,
    pub(crate) upload_timeout: Option<Duration>,
}

/// Spawn `concurrency` workers over a queue that is already filled and closed.
///
/// Each worker exits once the queue is drained.
pub(crate) fn spawn_upload_workers(
    ctx: WorkerContext,
    queue: mpsc::UnboundedReceiver<QueuedUpload>,
    concurrency: usize,
) -> JoinSet<()> {
    let queue = Arc::new(Mutex::new(queue));
    let mut workers = JoinSet::new();
    for worker in 0..concurrency.max(1) {
        let ctx = ctx.clone();
        let queue = Arc::clone(&queue);
        workers.spawn(async move {
            run_worker(worker, ctx, queue).await;
        });
    }
    workers
}

async fn run_worker(
    worker: usize,
    ctx: WorkerContext,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<QueuedUpload>>>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(QueuedUpload { mut task, barrier }) = next else {
            break;
        };

        ctx.gate.ensure_available().await;

        let identifier = task.item.identifier();
        match upload_once(&ctx, &task.item).await {
            Ok(token) => {
                tracing::debug!(
                    worker,
                    batch = task.batch,
                    identifier = %identifier,
                    "upload finished"
                );
                task.token = token;
            }
            Err(e) => {
                tracing::warn!(
                    worker,
                    batch = task.batch,
                    identifier = %identifier,
                    error = %e,
                    "upload failed"
                );
                task.error = Some(AddError::Upload(e.to_string()));
            }
        }

        // The orchestrator only stops listening once the run is over
        if barrier.send(task).await.is_err() {
            tracing::debug!(worker, identifier = %identifier, "batch no longer waiting");
        }
    }
    tracing::debug!(worker, "upload queue drained, worker exiting");
}

/// One upload attempt, bounded by the per-upload timeout if configured
async fn upload_once(
    ctx: &WorkerContext,
    item: &crate::item::UploadItem,
) -> crate::error::Result<crate::types::UploadToken> {
    let token = match ctx.upload_timeout {
        Some(limit) => tokio::time::timeout(limit, ctx.api.upload_bytes(item))
            .await
            .map_err(|_| Error::Other(format!("upload timed out after {limit:?}")))??,
        None => ctx.api.upload_bytes(item).await?,
    };
    if token.is_empty() {
        return Err(Error::Other("no upload token returned".to_string()));
    }
    Ok(token)
}
