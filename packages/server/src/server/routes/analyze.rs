use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::ErrorResponse;
use crate::kernel::jobs::{AnalysisRequest, Job};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url_to_analyze: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub job_id: Uuid,
}

/// Submit a URL for analysis.
///
/// A cached URL completes its job immediately with the stored result and
/// schedules no background work. Otherwise the job is enqueued for the
/// worker pool; a saturated queue is reported as 503 rather than queued
/// without bound.
pub async fn analyze_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Response {
    let job_id = Uuid::new_v4();
    let url = body.url_to_analyze;

    if let Some(cached) = state.cache.get(&url).await {
        info!(job_id = %job_id, url = %url, "serving cached analysis");
        state
            .jobs
            .insert(Job::completed_from_cache(job_id, cached))
            .await;
        return Json(AnalyzeResponse { job_id }).into_response();
    }

    state.jobs.insert(Job::new(job_id)).await;
    match state.queue.enqueue(AnalysisRequest {
        job_id,
        url: url.clone(),
    }) {
        Ok(()) => {
            info!(job_id = %job_id, url = %url, "analysis queued");
            Json(AnalyzeResponse { job_id }).into_response()
        }
        Err(e) => {
            // Backpressure: take the job back out so a rejected submission
            // leaves no trace.
            state.jobs.remove(&job_id).await;
            warn!(url = %url, error = %e, "rejecting analysis request");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}
