//! Brands, campaigns and dayparting windows declared in the config file.
//!
//! ```toml
//! [[brands]]
//! id = 1
//! name = "Acme"
//! daily_budget = 500
//! monthly_budget = 12000
//!
//! [[campaigns]]
//! id = 10
//! brand_id = 1
//! name = "Spring launch"
//! daily_budget = "120.50"      # optional, falls back to the brand
//! initial_state = "active"     # or "inactive" (default)
//!
//! [[schedules]]
//! campaign_id = 10
//! day_of_week = 0              # Monday
//! start = "09:00"
//! end = "17:00"
//! ```

use crate::campaign::{BrandId, CampaignId, InitialState};
use crate::engine::{NewBrand, NewCampaign, NewSchedule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandEntry {
    pub id: BrandId,
    pub name: String,
    pub daily_budget: Decimal,
    pub monthly_budget: Decimal,
}

impl From<&BrandEntry> for NewBrand {
    fn from(entry: &BrandEntry) -> Self {
        NewBrand {
            id: entry.id,
            name: entry.name.clone(),
            daily_budget: entry.daily_budget,
            monthly_budget: entry.monthly_budget,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEntry {
    pub id: CampaignId,
    pub brand_id: BrandId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<Decimal>,
    #[serde(default)]
    pub initial_state: InitialState,
}

impl From<&CampaignEntry> for NewCampaign {
    fn from(entry: &CampaignEntry) -> Self {
        NewCampaign {
            id: entry.id,
            brand_id: entry.brand_id,
            name: entry.name.clone(),
            daily_budget: entry.daily_budget,
            monthly_budget: entry.monthly_budget,
            initial_state: entry.initial_state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub campaign_id: CampaignId,
    /// 0 = Monday ... 6 = Sunday
    pub day_of_week: u8,
    pub start: String,
    pub end: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<&ScheduleEntry> for NewSchedule {
    fn from(entry: &ScheduleEntry) -> Self {
        NewSchedule {
            day_of_week: entry.day_of_week,
            start: entry.start.clone(),
            end: entry.end.clone(),
            is_active: entry.active,
        }
    }
}

/// Thresholds under which an Active campaign is flagged in the fleet summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    pub daily_headroom: Decimal,
    pub monthly_headroom: Decimal,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            daily_headroom: Decimal::from(50),
            monthly_headroom: Decimal::from(500),
        }
    }
}
