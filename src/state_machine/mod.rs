//! Campaign run-state transitions.
//!
//! [`next_state`] and [`operator_transition`] are pure: they map the current
//! state, what caused the evaluation, and the dayparting/budget outcome to the
//! state the campaign should be in. [`CampaignStateMachine`] owns the
//! per-campaign locks and is the only writer of `Campaign::state`.

#[cfg(test)]
mod tests;

use crate::campaign::{Campaign, CampaignId, PauseReason, RunState};
use crate::events::{BudgetEvent, EventSink, TransitionEvent};
use crate::policy::LimitStatus;
use crate::store::{CampaignStore, StoreError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

/// What prompted an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Tick,
    Spend,
    DailyReset,
    MonthlyReset,
    FullReset,
    Operator,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Tick => "tick",
            Trigger::Spend => "spend",
            Trigger::DailyReset => "daily_reset",
            Trigger::MonthlyReset => "monthly_reset",
            Trigger::FullReset => "full_reset",
            Trigger::Operator => "operator",
        }
    }

    /// Whether a campaign paused for `reason` is eligible for reactivation
    /// under this trigger. Manual pauses are never released automatically.
    pub fn releases(&self, reason: PauseReason) -> bool {
        use PauseReason::*;
        match self {
            Trigger::Tick => reason == OutsideDaypartingHours,
            Trigger::DailyReset => {
                matches!(reason, DailyBudgetExceeded | OutsideDaypartingHours)
            }
            Trigger::MonthlyReset => reason == MonthlyBudgetExceeded,
            Trigger::FullReset => reason != Manual,
            Trigger::Spend | Trigger::Operator => false,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined dayparting and budget outcome for one campaign at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub within_daypart: bool,
    pub limit: LimitStatus,
}

impl Evaluation {
    /// Where an automatically managed campaign belongs. Dayparting is checked
    /// first, then the daily ceiling, then the monthly one.
    pub fn desired_state(&self) -> RunState {
        if !self.within_daypart {
            return RunState::Paused(PauseReason::OutsideDaypartingHours);
        }
        match self.limit.pause_reason() {
            Some(reason) => RunState::Paused(reason),
            None => RunState::Active,
        }
    }
}

/// Compute the automatic transition for `current`.
///
/// Inactive and manually paused campaigns are never touched. Spend events can
/// only pause an Active campaign on budget grounds. Ticks move Active
/// campaigns and those waiting on their dayparting window. Reset sweeps
/// release the pause kinds they are responsible for, and only into the state
/// a fresh evaluation calls for.
pub fn next_state(current: RunState, trigger: Trigger, eval: &Evaluation) -> RunState {
    match (current, trigger) {
        (RunState::Inactive, _) | (RunState::Paused(PauseReason::Manual), _) => current,
        (_, Trigger::Operator) => current,
        (RunState::Active, Trigger::Spend) => match eval.limit.pause_reason() {
            Some(reason) => RunState::Paused(reason),
            None => RunState::Active,
        },
        (RunState::Paused(_), Trigger::Spend) => current,
        (RunState::Active, Trigger::Tick) => eval.desired_state(),
        (RunState::Active, _) => current,
        (RunState::Paused(reason), trigger) if trigger.releases(reason) => eval.desired_state(),
        (RunState::Paused(_), _) => current,
    }
}

/// Operator-issued state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorAction {
    Pause,
    Resume,
    Activate,
    Deactivate,
}

impl OperatorAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorAction::Pause => "pause",
            OperatorAction::Resume => "resume",
            OperatorAction::Activate => "activate",
            OperatorAction::Deactivate => "deactivate",
        }
    }
}

impl fmt::Display for OperatorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot {action} a campaign that is {from}")]
pub struct InvalidTransition {
    pub from: RunState,
    pub action: OperatorAction,
}

/// Compute the result of an operator action.
///
/// Resume and activate land wherever a fresh evaluation puts the campaign, so
/// an operator cannot push a campaign into `Active` while it is over budget or
/// outside its window.
pub fn operator_transition(
    current: RunState,
    action: OperatorAction,
    eval: &Evaluation,
) -> Result<RunState, InvalidTransition> {
    match (action, current) {
        (OperatorAction::Pause, _) => Ok(RunState::Paused(PauseReason::Manual)),
        (OperatorAction::Deactivate, _) => Ok(RunState::Inactive),
        (OperatorAction::Resume, RunState::Paused(PauseReason::Manual)) => {
            Ok(eval.desired_state())
        }
        (OperatorAction::Activate, RunState::Inactive) => Ok(eval.desired_state()),
        (action, from) => Err(InvalidTransition { from, action }),
    }
}

/// Proof that the caller holds a campaign's exclusive section.
pub struct CampaignGuard {
    campaign_id: CampaignId,
    _guard: OwnedMutexGuard<()>,
}

impl CampaignGuard {
    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }
}

/// Serializes work per campaign and persists state changes.
pub struct CampaignStateMachine {
    store: Arc<dyn CampaignStore>,
    events: Arc<dyn EventSink>,
    locks: DashMap<CampaignId, Arc<Mutex<()>>>,
}

impl CampaignStateMachine {
    pub fn new(store: Arc<dyn CampaignStore>, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            events,
            locks: DashMap::new(),
        }
    }

    /// Number of campaigns a lock has been created for.
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    /// Enter the exclusive section for one campaign. Other campaigns are
    /// unaffected.
    pub async fn lock(&self, campaign_id: CampaignId) -> CampaignGuard {
        let mutex = self
            .locks
            .entry(campaign_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        CampaignGuard {
            campaign_id,
            _guard: mutex.lock_owned().await,
        }
    }

    /// Persist `to` as the campaign's new state and emit a transition event.
    ///
    /// Re-applying the current state is a no-op that writes and emits nothing.
    /// On a store failure `campaign` is left unchanged.
    pub async fn apply(
        &self,
        guard: &CampaignGuard,
        campaign: &mut Campaign,
        to: RunState,
        cause: Trigger,
        now: DateTime<Utc>,
    ) -> Result<Option<TransitionEvent>, StoreError> {
        debug_assert_eq!(guard.campaign_id(), campaign.id);
        let from = campaign.state();
        if from == to {
            debug!(campaign_id = campaign.id, state = %from, cause = %cause, "No state change");
            return Ok(None);
        }

        let mut updated = campaign.clone();
        updated.set_state(to, now);
        self.store.save_campaign(&updated).await?;
        *campaign = updated;

        info!(
            campaign_id = campaign.id,
            from = %from,
            to = %to,
            cause = %cause,
            "Campaign state changed"
        );
        let event = TransitionEvent::new(campaign.id, from, to, cause, now);
        self.events.emit(BudgetEvent::Transition(event.clone()));
        Ok(Some(event))
    }

    /// Run the automatic transition rules and apply the result.
    pub async fn transition(
        &self,
        guard: &CampaignGuard,
        campaign: &mut Campaign,
        trigger: Trigger,
        eval: &Evaluation,
        now: DateTime<Utc>,
    ) -> Result<Option<TransitionEvent>, StoreError> {
        let to = next_state(campaign.state(), trigger, eval);
        self.apply(guard, campaign, to, trigger, now).await
    }

    /// Apply an operator action.
    pub async fn operate(
        &self,
        guard: &CampaignGuard,
        campaign: &mut Campaign,
        action: OperatorAction,
        eval: &Evaluation,
        now: DateTime<Utc>,
    ) -> Result<Option<TransitionEvent>, OperateError> {
        let to = operator_transition(campaign.state(), action, eval)?;
        Ok(self
            .apply(guard, campaign, to, Trigger::Operator, now)
            .await?)
    }
}

/// Errors from [`CampaignStateMachine::operate`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum OperateError {
    #[error(transparent)]
    Invalid(#[from] InvalidTransition),

    #[error(transparent)]
    Store(#[from] StoreError),
}
