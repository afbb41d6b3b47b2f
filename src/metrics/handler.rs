//! # Metrics HTTP Handler

use crate::api::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Handler for GET /metrics endpoint (Prometheus text format).
///
/// Campaign gauges are refreshed from the store before rendering. A store
/// failure leaves the previous gauge values in place; the scrape still succeeds.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.engine.state_counts().await {
        Ok(counts) => super::set_campaign_gauges(counts.active, counts.inactive, counts.paused),
        Err(e) => tracing::warn!(error = %e, "Could not refresh campaign gauges"),
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}
