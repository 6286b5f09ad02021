use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::ErrorResponse;
use crate::server::app::AppState;

/// All persisted analyses, most recent first.
pub async fn history_handler(Extension(state): Extension<AppState>) -> Response {
    match state.deps.history.recent().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!(error = %e, "failed to load analysis history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to load analysis history.")),
            )
                .into_response()
        }
    }
}
