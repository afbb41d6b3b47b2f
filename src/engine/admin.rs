//! Operator actions: brand, campaign and schedule creation, manual state changes.

use super::{BudgetEngine, EngineError};
use crate::campaign::{Brand, BrandId, Budgets, Campaign, CampaignId, InitialState, RunState};
use crate::dayparting::{parse_time_of_day, DaypartingSchedule};
use crate::events::TransitionEvent;
use crate::state_machine::OperatorAction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBrand {
    pub id: BrandId,
    pub name: String,
    pub daily_budget: Decimal,
    pub monthly_budget: Decimal,
}

/// Budgets left out fall back to the brand's ceilings.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaign {
    pub id: CampaignId,
    pub brand_id: BrandId,
    pub name: String,
    #[serde(default)]
    pub daily_budget: Option<Decimal>,
    #[serde(default)]
    pub monthly_budget: Option<Decimal>,
    #[serde(default)]
    pub initial_state: InitialState,
}

/// A dayparting window as supplied by an operator, times as `HH:MM[:SS]`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSchedule {
    pub day_of_week: u8,
    pub start: String,
    pub end: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Result of an operator action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReceipt {
    pub campaign_id: CampaignId,
    pub action: OperatorAction,
    pub run_state: RunState,
    pub transition: Option<TransitionEvent>,
}

impl BudgetEngine {
    pub async fn create_brand(&self, new: NewBrand) -> Result<Brand, EngineError> {
        if new.name.trim().is_empty() {
            return Err(EngineError::InvalidCampaign(
                "brand name cannot be empty".to_string(),
            ));
        }
        let brand = Brand {
            id: new.id,
            name: new.name,
            budgets: Budgets::new(new.daily_budget, new.monthly_budget)?,
        };
        self.store.insert_brand(brand.clone()).await?;
        info!(brand_id = brand.id, name = %brand.name, "Brand created");
        Ok(brand)
    }

    /// Create a campaign in the requested initial state.
    ///
    /// # Errors
    ///
    /// - `EngineError::UnknownBrand` if the brand does not exist
    /// - `EngineError::InvalidCampaign` for an empty name or non-positive budget
    /// - `EngineError::DuplicateCampaign` if the id is taken
    pub async fn create_campaign(&self, new: NewCampaign) -> Result<Campaign, EngineError> {
        if new.name.trim().is_empty() {
            return Err(crate::campaign::CampaignError::EmptyName.into());
        }
        let brand = self
            .store
            .load_brand(new.brand_id)
            .await?
            .ok_or(EngineError::UnknownBrand(new.brand_id))?;
        let budgets = Budgets::new(
            new.daily_budget.unwrap_or(brand.budgets.daily()),
            new.monthly_budget.unwrap_or(brand.budgets.monthly()),
        )?;

        let campaign = Campaign::new(
            new.id,
            brand.id,
            new.name,
            budgets,
            new.initial_state,
            self.clock.now(),
        );
        self.store.insert_campaign(campaign.clone()).await?;
        info!(
            campaign_id = campaign.id,
            brand_id = brand.id,
            state = %campaign.state(),
            "Campaign created"
        );
        Ok(campaign)
    }

    /// Add a dayparting window. It takes effect on the next evaluation.
    pub async fn add_schedule(
        &self,
        campaign_id: CampaignId,
        new: NewSchedule,
    ) -> Result<DaypartingSchedule, EngineError> {
        let schedule = DaypartingSchedule::new(
            campaign_id,
            new.day_of_week,
            parse_time_of_day(&new.start)?,
            parse_time_of_day(&new.end)?,
            new.is_active,
        )?;

        let _guard = self.lock_campaign(campaign_id).await?;
        self.store.save_schedule(schedule.clone()).await?;
        info!(
            campaign_id,
            day_of_week = schedule.day_of_week,
            start = %schedule.start_time,
            end = %schedule.end_time,
            "Dayparting window added"
        );
        Ok(schedule)
    }

    /// Apply an operator action inside the campaign's critical section.
    ///
    /// Resume and activate re-evaluate dayparting and budget, so the campaign
    /// may land in an automatic pause instead of `Active`.
    pub async fn operate(
        &self,
        campaign_id: CampaignId,
        action: OperatorAction,
    ) -> Result<ActionReceipt, EngineError> {
        let (guard, mut campaign) = self.lock_campaign(campaign_id).await?;
        let now = self.clock.now();
        let (eval, _) = self.evaluate(&campaign, now).await?;
        let transition = self
            .machine
            .operate(&guard, &mut campaign, action, &eval, now)
            .await?;
        Ok(ActionReceipt {
            campaign_id,
            action,
            run_state: campaign.state(),
            transition,
        })
    }

    pub async fn pause(&self, campaign_id: CampaignId) -> Result<ActionReceipt, EngineError> {
        self.operate(campaign_id, OperatorAction::Pause).await
    }

    pub async fn resume(&self, campaign_id: CampaignId) -> Result<ActionReceipt, EngineError> {
        self.operate(campaign_id, OperatorAction::Resume).await
    }

    pub async fn activate(&self, campaign_id: CampaignId) -> Result<ActionReceipt, EngineError> {
        self.operate(campaign_id, OperatorAction::Activate).await
    }

    pub async fn deactivate(&self, campaign_id: CampaignId) -> Result<ActionReceipt, EngineError> {
        self.operate(campaign_id, OperatorAction::Deactivate).await
    }
}
