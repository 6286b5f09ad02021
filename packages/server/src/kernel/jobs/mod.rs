//! In-memory job tracking: job model, bounded store, result cache, queue
//! and worker pool.

pub mod cache;
pub mod job;
pub mod queue;
pub mod store;
pub mod worker;

pub use cache::ResultCache;
pub use job::{Job, JobStatus};
pub use queue::{AnalysisRequest, JobQueue, SubmitError};
pub use store::JobStore;
pub use worker::spawn_workers;
