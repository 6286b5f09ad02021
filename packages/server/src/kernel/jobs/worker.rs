//! Worker pool draining the analysis queue.
//!
//! A fixed number of workers share one receiver; each claims a request,
//! runs the full pipeline for it, then returns for the next. The pool size
//! bounds how many sandboxed analyses run concurrently.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::queue::AnalysisRequest;
use crate::domains::analysis::pipeline::AnalysisPipeline;

/// Spawn `worker_count` workers draining `rx`. Workers exit when the queue
/// closes or the shutdown token fires.
pub fn spawn_workers(
    pipeline: Arc<AnalysisPipeline>,
    rx: mpsc::Receiver<AnalysisRequest>,
    worker_count: usize,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));
    (0..worker_count)
        .map(|index| {
            tokio::spawn(worker_loop(
                index,
                pipeline.clone(),
                rx.clone(),
                shutdown.clone(),
            ))
        })
        .collect()
}

async fn worker_loop(
    index: usize,
    pipeline: Arc<AnalysisPipeline>,
    rx: Arc<Mutex<mpsc::Receiver<AnalysisRequest>>>,
    shutdown: CancellationToken,
) {
    info!(worker = index, "analysis worker starting");

    loop {
        let request = tokio::select! {
            _ = shutdown.cancelled() => break,
            request = async { rx.lock().await.recv().await } => {
                match request {
                    Some(request) => request,
                    None => break,
                }
            }
        };

        info!(
            worker = index,
            job_id = %request.job_id,
            url = %request.url,
            "starting analysis"
        );
        pipeline.execute(request).await;
    }

    info!(worker = index, "analysis worker stopped");
}
