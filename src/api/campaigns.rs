//! Per-campaign endpoints: status, spend, creation, schedules and operator actions.

use super::{detached, ApiError, AppState, SpendRequest};
use crate::campaign::{Campaign, CampaignId};
use crate::dayparting::DaypartingSchedule;
use crate::engine::{ActionReceipt, CampaignStatus, NewCampaign, NewSchedule, SpendReceipt};
use crate::state_machine::OperatorAction;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// GET /v1/campaigns/:id/status
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CampaignId>,
) -> Result<Json<CampaignStatus>, ApiError> {
    Ok(Json(state.engine.get_status(id).await?))
}

/// POST /v1/campaigns/:id/spend
pub async fn spend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CampaignId>,
    Json(request): Json<SpendRequest>,
) -> Result<Json<SpendReceipt>, ApiError> {
    let amount = request.amount;
    let receipt =
        detached(&state.engine, |engine| async move { engine.record_spend(id, amount).await })
            .await?;
    Ok(Json(receipt))
}

/// POST /v1/campaigns
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewCampaign>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let campaign = state.engine.create_campaign(request).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// POST /v1/campaigns/:id/schedules
pub async fn add_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CampaignId>,
    Json(request): Json<NewSchedule>,
) -> Result<(StatusCode, Json<DaypartingSchedule>), ApiError> {
    let schedule =
        detached(&state.engine, |engine| async move { engine.add_schedule(id, request).await })
            .await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn operate(
    state: &AppState,
    id: CampaignId,
    action: OperatorAction,
) -> Result<Json<ActionReceipt>, ApiError> {
    let receipt =
        detached(&state.engine, |engine| async move { engine.operate(id, action).await }).await?;
    Ok(Json(receipt))
}

pub async fn pause(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CampaignId>,
) -> Result<Json<ActionReceipt>, ApiError> {
    operate(&state, id, OperatorAction::Pause).await
}

pub async fn resume(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CampaignId>,
) -> Result<Json<ActionReceipt>, ApiError> {
    operate(&state, id, OperatorAction::Resume).await
}

pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CampaignId>,
) -> Result<Json<ActionReceipt>, ApiError> {
    operate(&state, id, OperatorAction::Activate).await
}

pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CampaignId>,
) -> Result<Json<ActionReceipt>, ApiError> {
    operate(&state, id, OperatorAction::Deactivate).await
}
