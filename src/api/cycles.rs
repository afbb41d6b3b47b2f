//! Manual cycle triggers. Each returns the cycle's report.
//!
//! Cycles run detached from the request, so a timeout never stops a sweep
//! halfway through.

use super::{detached, ApiError, AppState};
use crate::engine::CycleReport;
use axum::{extract::State, Json};
use std::sync::Arc;

pub async fn tick(State(state): State<Arc<AppState>>) -> Result<Json<CycleReport>, ApiError> {
    let report = detached(&state.engine, |engine| async move { engine.run_tick().await }).await?;
    Ok(Json(report))
}

pub async fn daily(State(state): State<Arc<AppState>>) -> Result<Json<CycleReport>, ApiError> {
    let report =
        detached(&state.engine, |engine| async move { engine.run_daily_reset().await }).await?;
    Ok(Json(report))
}

/// Outside day 1 of a month this answers with a skipped report.
pub async fn monthly(State(state): State<Arc<AppState>>) -> Result<Json<CycleReport>, ApiError> {
    let report =
        detached(&state.engine, |engine| async move { engine.run_monthly_reset().await }).await?;
    Ok(Json(report))
}

pub async fn full_reset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CycleReport>, ApiError> {
    let report =
        detached(&state.engine, |engine| async move { engine.run_full_reset().await }).await?;
    Ok(Json(report))
}
