//! Fleet-level endpoints: brands, summary and the event history.

use super::{ApiError, AppState, EventsQuery};
use crate::campaign::Brand;
use crate::engine::{FleetSummary, NewBrand};
use crate::events::BudgetEvent;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// POST /v1/brands
pub async fn create_brand(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewBrand>,
) -> Result<(StatusCode, Json<Brand>), ApiError> {
    let brand = state.engine.create_brand(request).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

/// GET /v1/summary
pub async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FleetSummary>, ApiError> {
    Ok(Json(state.engine.summary().await?))
}

/// GET /v1/events?limit=N
pub async fn events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<BudgetEvent>> {
    Json(state.events.recent(query.limit()))
}
