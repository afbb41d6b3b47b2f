//! Read-only queries: campaign status, fleet and brand summaries.

use super::{BudgetEngine, EngineError};
use crate::campaign::{BrandId, Budgets, Campaign, CampaignId, PauseReason, RunState};
use crate::dayparting::{self, DaypartingSchedule};
use crate::ledger::SpendSnapshot;
use crate::policy::LimitStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

fn remaining(budget: Decimal, spent: Decimal) -> Decimal {
    (budget - spent).max(Decimal::ZERO)
}

/// Everything the dashboard shows for one campaign.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignStatus {
    pub campaign_id: CampaignId,
    pub brand_id: BrandId,
    pub name: String,
    #[serde(skip)]
    pub run_state: RunState,
    pub state: &'static str,
    pub reason: Option<PauseReason>,
    pub daily_spend: Decimal,
    pub monthly_spend: Decimal,
    pub budgets: Budgets,
    pub daily_remaining: Decimal,
    pub monthly_remaining: Decimal,
    pub limit: LimitStatus,
    pub within_daypart: bool,
    /// Windows configured for today's weekday
    pub todays_windows: Vec<DaypartingSchedule>,
    pub updated_at: DateTime<Utc>,
}

/// Campaign counts per run state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub paused: usize,
    /// Paused campaigns broken down by reason
    pub pause_reasons: BTreeMap<PauseReason, usize>,
}

impl StateCounts {
    fn add(&mut self, state: RunState) {
        self.total += 1;
        match state {
            RunState::Active => self.active += 1,
            RunState::Inactive => self.inactive += 1,
            RunState::Paused(reason) => {
                self.paused += 1;
                *self.pause_reasons.entry(reason).or_default() += 1;
            }
        }
    }
}

/// Today's spend of a brand's campaigns against the brand ceilings.
#[derive(Debug, Clone, Serialize)]
pub struct BrandSummary {
    pub brand_id: BrandId,
    pub name: String,
    pub campaigns: usize,
    pub active_campaigns: usize,
    pub daily_spend: Decimal,
    pub monthly_spend: Decimal,
    pub daily_budget: Decimal,
    pub monthly_budget: Decimal,
    pub daily_remaining: Decimal,
    pub monthly_remaining: Decimal,
}

/// An Active campaign close to one of its ceilings.
#[derive(Debug, Clone, Serialize)]
pub struct AttentionItem {
    pub campaign_id: CampaignId,
    pub name: String,
    pub daily_remaining: Decimal,
    pub monthly_remaining: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetSummary {
    pub generated_at: DateTime<Utc>,
    pub counts: StateCounts,
    pub brands: Vec<BrandSummary>,
    pub needs_attention: Vec<AttentionItem>,
}

impl BudgetEngine {
    /// Current state, counters and ceilings of one campaign.
    pub async fn get_status(&self, campaign_id: CampaignId) -> Result<CampaignStatus, EngineError> {
        let now = self.clock.now();
        let campaign = self.load(campaign_id).await?;
        let (eval, snapshot) = self.evaluate(&campaign, now).await?;
        let todays_windows = self
            .store
            .load_schedules(campaign_id, dayparting::weekday_index(now))
            .await?;
        Ok(status_of(&campaign, snapshot, eval.limit, eval.within_daypart, todays_windows))
    }

    /// Per-state counts, read without locking.
    pub async fn state_counts(&self) -> Result<StateCounts, EngineError> {
        let mut counts = StateCounts::default();
        for id in self.store.list_campaign_ids().await? {
            if let Some(campaign) = self.store.load_campaign(id).await? {
                counts.add(campaign.state());
            }
        }
        Ok(counts)
    }

    /// Fleet-wide counts, per-brand spend totals and the attention list.
    pub async fn summary(&self) -> Result<FleetSummary, EngineError> {
        let now = self.clock.now();
        let mut counts = StateCounts::default();
        let mut needs_attention = Vec::new();
        let mut per_brand: HashMap<BrandId, (usize, usize, SpendSnapshot)> = HashMap::new();

        for id in self.store.list_campaign_ids().await? {
            let Some(campaign) = self.store.load_campaign(id).await? else {
                continue;
            };
            let snapshot = self.ledger.snapshot(id, now).await?;
            let state = campaign.state();
            counts.add(state);

            let totals = per_brand.entry(campaign.brand_id).or_default();
            totals.0 += 1;
            if state == RunState::Active {
                totals.1 += 1;
            }
            totals.2.daily_spend += snapshot.daily_spend;
            totals.2.monthly_spend += snapshot.monthly_spend;

            if state == RunState::Active {
                let daily_remaining = remaining(campaign.budgets.daily(), snapshot.daily_spend);
                let monthly_remaining =
                    remaining(campaign.budgets.monthly(), snapshot.monthly_spend);
                if daily_remaining < self.attention.daily_headroom
                    || monthly_remaining < self.attention.monthly_headroom
                {
                    needs_attention.push(AttentionItem {
                        campaign_id: id,
                        name: campaign.name.clone(),
                        daily_remaining,
                        monthly_remaining,
                    });
                }
            }
        }

        let brands = self
            .store
            .list_brands()
            .await?
            .into_iter()
            .map(|brand| {
                let (campaigns, active_campaigns, spent) =
                    per_brand.remove(&brand.id).unwrap_or_default();
                BrandSummary {
                    brand_id: brand.id,
                    name: brand.name,
                    campaigns,
                    active_campaigns,
                    daily_spend: spent.daily_spend,
                    monthly_spend: spent.monthly_spend,
                    daily_budget: brand.budgets.daily(),
                    monthly_budget: brand.budgets.monthly(),
                    daily_remaining: remaining(brand.budgets.daily(), spent.daily_spend),
                    monthly_remaining: remaining(brand.budgets.monthly(), spent.monthly_spend),
                }
            })
            .collect();

        Ok(FleetSummary {
            generated_at: now,
            counts,
            brands,
            needs_attention,
        })
    }
}

fn status_of(
    campaign: &Campaign,
    snapshot: SpendSnapshot,
    limit: LimitStatus,
    within_daypart: bool,
    todays_windows: Vec<DaypartingSchedule>,
) -> CampaignStatus {
    let state = campaign.state();
    CampaignStatus {
        campaign_id: campaign.id,
        brand_id: campaign.brand_id,
        name: campaign.name.clone(),
        run_state: state,
        state: state.label(),
        reason: state.pause_reason(),
        daily_spend: snapshot.daily_spend,
        monthly_spend: snapshot.monthly_spend,
        budgets: campaign.budgets,
        daily_remaining: remaining(campaign.budgets.daily(), snapshot.daily_spend),
        monthly_remaining: remaining(campaign.budgets.monthly(), snapshot.monthly_spend),
        limit,
        within_daypart,
        todays_windows,
        updated_at: campaign.updated_at,
    }
}
