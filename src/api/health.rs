//! Health check endpoint handler.

use crate::api::AppState;
use crate::engine::StateCounts;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    /// Absent when the store could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaigns: Option<StateCounts>,
}

/// GET /health - Return service health and campaign counts.
///
/// Answers 200 even when the store is down; `status` is then `degraded`.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, campaigns) = match state.engine.state_counts().await {
        Ok(counts) => ("healthy", Some(counts)),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read campaigns");
            ("degraded", None)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        campaigns,
    })
}
