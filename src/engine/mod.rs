//! Budget enforcement engine.
//!
//! [`BudgetEngine`] is the entry point for everything that mutates or reads
//! campaign state: spend recording, the periodic cycles, operator actions and
//! the status queries. Every mutation of one campaign happens inside that
//! campaign's exclusive section, taken from the
//! [`CampaignStateMachine`](crate::state_machine::CampaignStateMachine).

mod admin;
mod cycles;
mod error;
mod status;

pub use admin::*;
pub use cycles::*;
pub use error::*;
pub use status::*;

use crate::campaign::{Campaign, CampaignId, RunState};
use crate::clock::Clock;
use crate::config::AttentionConfig;
use crate::dayparting;
use crate::events::{BudgetEvent, EventSink, OperationFailure, TransitionEvent};
use crate::ledger::{Ledger, SpendSnapshot};
use crate::policy;
use crate::state_machine::{CampaignGuard, CampaignStateMachine, Evaluation, Trigger};
use crate::store::CampaignStore;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_SWEEP_CONCURRENCY: usize = 16;

/// Result of a recorded spend event.
#[derive(Debug, Clone, Serialize)]
pub struct SpendReceipt {
    pub campaign_id: CampaignId,
    pub amount: Decimal,
    pub daily_spend: Decimal,
    pub monthly_spend: Decimal,
    pub run_state: RunState,
    pub transition: Option<TransitionEvent>,
}

pub struct BudgetEngine {
    store: Arc<dyn CampaignStore>,
    ledger: Ledger,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    machine: CampaignStateMachine,
    sweep_concurrency: usize,
    attention: AttentionConfig,
}

impl BudgetEngine {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            ledger: Ledger::new(Arc::clone(&store)),
            machine: CampaignStateMachine::new(Arc::clone(&store), Arc::clone(&events)),
            store,
            clock,
            events,
            sweep_concurrency: DEFAULT_SWEEP_CONCURRENCY,
            attention: AttentionConfig::default(),
        }
    }

    /// Maximum number of campaigns a sweep processes at once.
    pub fn with_sweep_concurrency(mut self, concurrency: usize) -> Self {
        self.sweep_concurrency = concurrency.max(1);
        self
    }

    pub fn with_attention(mut self, attention: AttentionConfig) -> Self {
        self.attention = attention;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn store(&self) -> &Arc<dyn CampaignStore> {
        &self.store
    }

    /// Record a spend event and apply any budget-driven pause.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidAmount` for a negative amount, before anything is locked
    /// - `EngineError::UnknownCampaign` if the campaign does not exist
    /// - `EngineError::StoreUnavailable` if the store fails; also reported to the event sink
    pub async fn record_spend(
        &self,
        campaign_id: CampaignId,
        amount: Decimal,
    ) -> Result<SpendReceipt, EngineError> {
        if amount < Decimal::ZERO {
            return Err(EngineError::InvalidAmount(amount));
        }
        let result = self.record_spend_locked(campaign_id, amount).await;
        if let Err(err) = &result {
            if err.is_transient() {
                self.report_failure("record_spend", None, Some(campaign_id), err);
            }
        }
        result
    }

    async fn record_spend_locked(
        &self,
        campaign_id: CampaignId,
        amount: Decimal,
    ) -> Result<SpendReceipt, EngineError> {
        let (guard, mut campaign) = self.lock_campaign(campaign_id).await?;
        let now = self.clock.now();

        let snapshot = self.ledger.record_spend(campaign_id, amount, now).await?;
        crate::metrics::record_spend(amount);
        debug!(
            campaign_id,
            amount = %amount,
            daily_spend = %snapshot.daily_spend,
            monthly_spend = %snapshot.monthly_spend,
            "Spend recorded"
        );

        // Spend only moves campaigns on budget grounds; dayparting is the
        // tick's job, so it is not loaded here.
        let eval = Evaluation {
            within_daypart: true,
            limit: policy::evaluate(&campaign.budgets, &snapshot),
        };
        let transition = self
            .machine
            .transition(&guard, &mut campaign, Trigger::Spend, &eval, now)
            .await?;

        Ok(SpendReceipt {
            campaign_id,
            amount,
            daily_spend: snapshot.daily_spend,
            monthly_spend: snapshot.monthly_spend,
            run_state: campaign.state(),
            transition,
        })
    }

    async fn load(&self, campaign_id: CampaignId) -> Result<Campaign, EngineError> {
        self.store
            .load_campaign(campaign_id)
            .await?
            .ok_or(EngineError::UnknownCampaign(campaign_id))
    }

    /// Enter a known campaign's critical section and read it there.
    ///
    /// Unknown ids are rejected before a lock is ever created for them.
    /// The store has no removal, so the check still holds once locked.
    async fn lock_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<(CampaignGuard, Campaign), EngineError> {
        self.load(campaign_id).await?;
        let guard = self.machine.lock(campaign_id).await;
        let campaign = self.load(campaign_id).await?;
        Ok((guard, campaign))
    }

    /// Dayparting then budget, as of `now`. Only today's active windows gate.
    async fn evaluate(
        &self,
        campaign: &Campaign,
        now: DateTime<Utc>,
    ) -> Result<(Evaluation, SpendSnapshot), EngineError> {
        let todays = self
            .store
            .load_schedules(campaign.id, dayparting::weekday_index(now))
            .await?;
        let schedules = dayparting::gating_windows(todays, now);
        let snapshot = self.ledger.snapshot(campaign.id, now).await?;
        let eval = Evaluation {
            within_daypart: dayparting::is_allowed(&schedules, now),
            limit: policy::evaluate(&campaign.budgets, &snapshot),
        };
        Ok((eval, snapshot))
    }

    fn report_failure(
        &self,
        operation: &str,
        cycle_id: Option<&str>,
        campaign_id: Option<CampaignId>,
        err: &EngineError,
    ) {
        self.events
            .emit(BudgetEvent::OperationFailed(OperationFailure {
                operation: operation.to_string(),
                cycle_id: cycle_id.map(str::to_string),
                campaign_id,
                error: err.to_string(),
                timestamp: self.clock.now(),
            }));
    }
}
