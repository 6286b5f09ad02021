//! Application setup and server configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::domains::analysis::AnalysisPipeline;
use crate::kernel::jobs::{spawn_workers, JobQueue, JobStore, ResultCache};
use crate::kernel::ServerDeps;
use crate::server::routes::{
    analyze_handler, health_handler, history_handler, results_handler,
};

/// Sizing and eviction knobs for the in-memory stores and worker pool.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub job_capacity: u64,
    pub job_ttl: Duration,
    pub cache_capacity: u64,
    pub cache_ttl: Duration,
    pub job_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_capacity: 64,
            job_capacity: 10_000,
            job_ttl: Duration::from_secs(24 * 60 * 60),
            cache_capacity: 1_000,
            cache_ttl: Duration::from_secs(60 * 60),
            job_timeout: Duration::from_secs(300),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<JobStore>,
    pub cache: Arc<ResultCache>,
    pub queue: JobQueue,
    pub deps: ServerDeps,
}

/// Build the Axum application router.
///
/// Also spawns the analysis worker pool; workers run until `shutdown`
/// fires or the queue closes.
pub fn build_app(
    deps: ServerDeps,
    options: PipelineOptions,
    screenshots_dir: &Path,
    shutdown: CancellationToken,
) -> Router {
    let jobs = Arc::new(JobStore::new(options.job_capacity, options.job_ttl));
    let cache = Arc::new(ResultCache::new(
        options.cache_capacity,
        options.cache_ttl,
    ));
    let (queue, queue_rx) = JobQueue::bounded(options.queue_capacity);

    let pipeline = Arc::new(AnalysisPipeline::new(
        jobs.clone(),
        cache.clone(),
        deps.clone(),
        options.job_timeout,
    ));
    spawn_workers(pipeline, queue_rx, options.worker_count, shutdown);

    let app_state = AppState {
        jobs,
        cache,
        queue,
        deps,
    };

    // CORS configuration - the polling UI may be served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/results/:job_id", get(results_handler))
        .route("/history", get(history_handler))
        .route("/health", get(health_handler))
        // Captured screenshots are written to disk keyed by job id and
        // served as static assets.
        .nest_service("/static/screenshots", ServeDir::new(screenshots_dir))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
