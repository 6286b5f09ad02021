use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    history_store: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Checks history store connectivity and responsiveness. Returns 200 OK if
/// healthy, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let history_store = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.deps.history.ping(),
    )
    .await
    {
        Ok(Ok(())) => ComponentHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => ComponentHealth {
            status: "error".to_string(),
            error: Some(format!("{:#}", e)),
        },
        Err(_) => ComponentHealth {
            status: "error".to_string(),
            error: Some("Ping timeout (>5s)".to_string()),
        },
    };

    let is_healthy = history_store.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            history_store,
        }),
    )
}
