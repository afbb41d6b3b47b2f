//! Campaign domain types.
//!
//! A [`Campaign`] belongs to a [`Brand`], carries its own daily and monthly
//! [`Budgets`], and is always in exactly one [`RunState`]. The pause reason is
//! part of the `Paused` variant, so a reason can never exist without the
//! matching state.

mod error;

pub use error::*;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type CampaignId = u64;
pub type BrandId = u64;

/// Daily and monthly spend ceilings. Both are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    daily: Decimal,
    monthly: Decimal,
}

impl Budgets {
    /// Build a validated budget pair.
    ///
    /// # Errors
    ///
    /// Returns `CampaignError::InvalidBudget` if either ceiling is zero or negative.
    pub fn new(daily: Decimal, monthly: Decimal) -> Result<Self, CampaignError> {
        if daily <= Decimal::ZERO {
            return Err(CampaignError::InvalidBudget {
                field: "daily_budget",
                value: daily,
            });
        }
        if monthly <= Decimal::ZERO {
            return Err(CampaignError::InvalidBudget {
                field: "monthly_budget",
                value: monthly,
            });
        }
        Ok(Self { daily, monthly })
    }

    pub fn daily(&self) -> Decimal {
        self.daily
    }

    pub fn monthly(&self) -> Decimal {
        self.monthly
    }
}

/// An advertiser. Supplies default ceilings to campaigns created without their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub budgets: Budgets,
}

/// Why a campaign is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    DailyBudgetExceeded,
    MonthlyBudgetExceeded,
    OutsideDaypartingHours,
    Manual,
}

impl PauseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseReason::DailyBudgetExceeded => "daily_budget_exceeded",
            PauseReason::MonthlyBudgetExceeded => "monthly_budget_exceeded",
            PauseReason::OutsideDaypartingHours => "outside_dayparting_hours",
            PauseReason::Manual => "manual",
        }
    }
}

impl fmt::Display for PauseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run state of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum RunState {
    Active,
    Inactive,
    Paused(PauseReason),
}

impl RunState {
    pub fn pause_reason(&self) -> Option<PauseReason> {
        match self {
            RunState::Paused(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, RunState::Paused(_))
    }

    /// State name without the reason, used for metric labels and counts.
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Active => "active",
            RunState::Inactive => "inactive",
            RunState::Paused(_) => "paused",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Paused(reason) => write!(f, "paused({})", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// The states an operator may create a campaign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialState {
    Active,
    #[default]
    Inactive,
}

impl From<InitialState> for RunState {
    fn from(initial: InitialState) -> Self {
        match initial {
            InitialState::Active => RunState::Active,
            InitialState::Inactive => RunState::Inactive,
        }
    }
}

/// An advertising campaign.
///
/// The run state is only readable from outside the crate; every change goes
/// through [`crate::state_machine::CampaignStateMachine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub brand_id: BrandId,
    pub name: String,
    pub budgets: Budgets,
    state: RunState,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(
        id: CampaignId,
        brand_id: BrandId,
        name: impl Into<String>,
        budgets: Budgets,
        initial: InitialState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            brand_id,
            name: name.into(),
            budgets,
            state: initial.into(),
            updated_at: created_at,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn pause_reason(&self) -> Option<PauseReason> {
        self.state.pause_reason()
    }

    pub(crate) fn set_state(&mut self, state: RunState, at: DateTime<Utc>) {
        self.state = state;
        self.updated_at = at;
    }
}
