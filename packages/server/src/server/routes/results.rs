use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::ErrorResponse;
use crate::server::app::AppState;

/// Poll a job's current snapshot.
///
/// Unknown ids (including ids that aren't UUIDs at all) get the same
/// error-shaped body with HTTP 200; polling never surfaces a
/// transport-level failure.
pub async fn results_handler(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let snapshot = match job_id.parse::<Uuid>() {
        Ok(id) => state.jobs.snapshot(&id).await,
        Err(_) => None,
    };

    match snapshot {
        Some(job) => Json(job).into_response(),
        None => Json(ErrorResponse::new("Job ID not found.")).into_response(),
    }
}
