//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, Json};
use picbox_core::models::HealthResponse;
use std::sync::Arc;

/// Liveness plus upload directory state
///
/// Always 200: a missing upload directory is normal until the first upload creates it.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let root = state.storage.root();
    let storage = match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => "ready",
        Ok(_) => {
            tracing::warn!(upload_dir = %root.display(), "Upload path exists but is not a directory");
            "unavailable"
        }
        Err(_) => "absent",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        storage: storage.to_string(),
    })
}
