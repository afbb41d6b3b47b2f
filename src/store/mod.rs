//! Persistence collaborator.
//!
//! The engine only talks to storage through [`CampaignStore`]. The bundled
//! [`InMemoryStore`] keeps everything in concurrent maps and is what `serve`
//! runs with.

mod error;
mod memory;

pub use error::*;
pub use memory::InMemoryStore;

use crate::campaign::{Brand, BrandId, Campaign, CampaignId};
use crate::dayparting::DaypartingSchedule;
use crate::ledger::SpendEntry;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Narrow storage interface for campaigns, brands, spend rows and schedules.
///
/// Implementations must be safe to call concurrently. Callers serialize
/// writes to a single campaign, so implementations need no cross-call
/// transactions.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn load_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, StoreError>;

    /// Insert a new campaign.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the id is taken.
    async fn insert_campaign(&self, campaign: Campaign) -> Result<(), StoreError>;

    /// Overwrite an existing campaign.
    async fn save_campaign(&self, campaign: &Campaign) -> Result<(), StoreError>;

    /// All campaign ids, ascending.
    async fn list_campaign_ids(&self) -> Result<Vec<CampaignId>, StoreError>;

    async fn load_brand(&self, id: BrandId) -> Result<Option<Brand>, StoreError>;

    async fn insert_brand(&self, brand: Brand) -> Result<(), StoreError>;

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError>;

    async fn load_spend(
        &self,
        campaign_id: CampaignId,
        date: NaiveDate,
    ) -> Result<Option<SpendEntry>, StoreError>;

    /// The most recent entry dated strictly before `date`.
    async fn latest_spend_before(
        &self,
        campaign_id: CampaignId,
        date: NaiveDate,
    ) -> Result<Option<SpendEntry>, StoreError>;

    async fn save_spend(&self, entry: &SpendEntry) -> Result<(), StoreError>;

    /// Every entry of a campaign, oldest first.
    async fn list_spend(&self, campaign_id: CampaignId) -> Result<Vec<SpendEntry>, StoreError>;

    async fn load_schedules(
        &self,
        campaign_id: CampaignId,
        day_of_week: u8,
    ) -> Result<Vec<DaypartingSchedule>, StoreError>;

    async fn list_schedules(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<DaypartingSchedule>, StoreError>;

    /// Add a window.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Schedule` if an active window would overlap another
    /// active window of the same campaign on the same day.
    async fn save_schedule(&self, schedule: DaypartingSchedule) -> Result<(), StoreError>;
}
