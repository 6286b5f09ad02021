//! Bounded queue feeding the analysis worker pool.
//!
//! Submission never blocks the request path: a full queue is reported to
//! the caller as backpressure instead of spawning unbounded work.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// One unit of background work: analyze `url` under job `job_id`.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub job_id: Uuid,
    pub url: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("analysis queue is full")]
    QueueFull,
    #[error("analysis workers have shut down")]
    WorkersStopped,
}

/// Cloneable submit handle for the bounded analysis queue.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<AnalysisRequest>,
}

impl JobQueue {
    /// Create a queue with the given capacity, returning the submit handle
    /// and the receiver the worker pool drains.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<AnalysisRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, request: AnalysisRequest) -> Result<(), SubmitError> {
        self.tx.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::QueueFull,
            TrySendError::Closed(_) => SubmitError::WorkersStopped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            job_id: Uuid::new_v4(),
            url: "http://example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn enqueue_accepts_until_capacity() {
        let (queue, _rx) = JobQueue::bounded(2);
        assert!(queue.enqueue(request()).is_ok());
        assert!(queue.enqueue(request()).is_ok());
        assert_eq!(queue.enqueue(request()), Err(SubmitError::QueueFull));
    }

    #[tokio::test]
    async fn enqueue_reports_closed_receiver() {
        let (queue, rx) = JobQueue::bounded(2);
        drop(rx);
        assert_eq!(queue.enqueue(request()), Err(SubmitError::WorkersStopped));
    }

    #[tokio::test]
    async fn drained_queue_accepts_again() {
        let (queue, mut rx) = JobQueue::bounded(1);
        assert!(queue.enqueue(request()).is_ok());
        assert_eq!(queue.enqueue(request()), Err(SubmitError::QueueFull));

        rx.recv().await.unwrap();
        assert!(queue.enqueue(request()).is_ok());
    }
}
