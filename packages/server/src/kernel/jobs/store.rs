//! Bounded in-memory job store.
//!
//! Jobs are owned by the store; the submit path and each job's own pipeline
//! execution are the only writers, so get-modify-insert is race-free per
//! job. Every insert is atomic with respect to readers: a poller always
//! observes a fully-written snapshot.

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use super::job::Job;
use crate::domains::analysis::models::HistoryRecord;

pub const DEFAULT_JOB_CAPACITY: u64 = 10_000;
pub const DEFAULT_JOB_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Capacity- and TTL-bounded map from job id to job state.
pub struct JobStore {
    jobs: Cache<Uuid, Job>,
}

impl JobStore {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        Self {
            jobs: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(time_to_live)
                .build(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_JOB_CAPACITY, DEFAULT_JOB_TTL)
    }

    pub async fn insert(&self, job: Job) {
        self.jobs.insert(job.id, job).await;
    }

    /// Read-only snapshot of a job's current state. Never blocks on
    /// pipeline progress.
    pub async fn snapshot(&self, id: &Uuid) -> Option<Job> {
        self.jobs.get(id).await
    }

    pub async fn remove(&self, id: &Uuid) {
        self.jobs.invalidate(id).await;
    }

    /// Record a stage boundary for a job.
    pub async fn advance(&self, id: Uuid, progress: f32, step: &str) {
        if let Some(mut job) = self.jobs.get(&id).await {
            job.advance(progress, step);
            self.jobs.insert(id, job).await;
        }
    }

    pub async fn complete(&self, id: Uuid, record: HistoryRecord) {
        if let Some(mut job) = self.jobs.get(&id).await {
            job.complete(record);
            self.jobs.insert(id, job).await;
        }
    }

    pub async fn fail(&self, id: Uuid, message: impl Into<String>) {
        if let Some(mut job) = self.jobs.get(&id).await {
            job.fail(message);
            self.jobs.insert(id, job).await;
        }
    }
}
