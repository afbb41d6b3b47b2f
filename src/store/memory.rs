use super::{CampaignStore, StoreError};
use crate::campaign::{Brand, BrandId, Campaign, CampaignId};
use crate::dayparting::{DaypartingSchedule, ScheduleError};
use crate::ledger::SpendEntry;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::BTreeMap;

/// In-process store backed by DashMap.
///
/// Spend rows are kept in a date-ordered map per campaign so the
/// "latest entry before" lookup is a range query.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    campaigns: DashMap<CampaignId, Campaign>,
    brands: DashMap<BrandId, Brand>,
    spend: DashMap<CampaignId, BTreeMap<NaiveDate, SpendEntry>>,
    schedules: DashMap<CampaignId, Vec<DaypartingSchedule>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn campaign_count(&self) -> usize {
        self.campaigns.len()
    }
}

#[async_trait]
impl CampaignStore for InMemoryStore {
    async fn load_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, StoreError> {
        Ok(self.campaigns.get(&id).map(|c| c.value().clone()))
    }

    async fn insert_campaign(&self, campaign: Campaign) -> Result<(), StoreError> {
        use dashmap::mapref::entry::Entry;
        match self.campaigns.entry(campaign.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                kind: "campaign",
                id: campaign.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(campaign);
                Ok(())
            }
        }
    }

    async fn save_campaign(&self, campaign: &Campaign) -> Result<(), StoreError> {
        match self.campaigns.get_mut(&campaign.id) {
            Some(mut existing) => {
                *existing = campaign.clone();
                Ok(())
            }
            None => Err(StoreError::Missing {
                kind: "campaign",
                id: campaign.id,
            }),
        }
    }

    async fn list_campaign_ids(&self) -> Result<Vec<CampaignId>, StoreError> {
        let mut ids: Vec<CampaignId> = self.campaigns.iter().map(|c| *c.key()).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn load_brand(&self, id: BrandId) -> Result<Option<Brand>, StoreError> {
        Ok(self.brands.get(&id).map(|b| b.value().clone()))
    }

    async fn insert_brand(&self, brand: Brand) -> Result<(), StoreError> {
        use dashmap::mapref::entry::Entry;
        match self.brands.entry(brand.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                kind: "brand",
                id: brand.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(brand);
                Ok(())
            }
        }
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError> {
        let mut brands: Vec<Brand> = self.brands.iter().map(|b| b.value().clone()).collect();
        brands.sort_by_key(|b| b.id);
        Ok(brands)
    }

    async fn load_spend(
        &self,
        campaign_id: CampaignId,
        date: NaiveDate,
    ) -> Result<Option<SpendEntry>, StoreError> {
        Ok(self
            .spend
            .get(&campaign_id)
            .and_then(|rows| rows.get(&date).cloned()))
    }

    async fn latest_spend_before(
        &self,
        campaign_id: CampaignId,
        date: NaiveDate,
    ) -> Result<Option<SpendEntry>, StoreError> {
        Ok(self.spend.get(&campaign_id).and_then(|rows| {
            rows.range(..date)
                .next_back()
                .map(|(_, entry)| entry.clone())
        }))
    }

    async fn save_spend(&self, entry: &SpendEntry) -> Result<(), StoreError> {
        self.spend
            .entry(entry.campaign_id)
            .or_default()
            .insert(entry.date, entry.clone());
        Ok(())
    }

    async fn list_spend(&self, campaign_id: CampaignId) -> Result<Vec<SpendEntry>, StoreError> {
        Ok(self
            .spend
            .get(&campaign_id)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn load_schedules(
        &self,
        campaign_id: CampaignId,
        day_of_week: u8,
    ) -> Result<Vec<DaypartingSchedule>, StoreError> {
        Ok(self
            .schedules
            .get(&campaign_id)
            .map(|all| {
                all.iter()
                    .filter(|s| s.day_of_week == day_of_week)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_schedules(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<DaypartingSchedule>, StoreError> {
        Ok(self
            .schedules
            .get(&campaign_id)
            .map(|all| all.value().clone())
            .unwrap_or_default())
    }

    async fn save_schedule(&self, schedule: DaypartingSchedule) -> Result<(), StoreError> {
        let mut windows = self.schedules.entry(schedule.campaign_id).or_default();
        if schedule.is_active
            && windows
                .iter()
                .any(|existing| existing.is_active && existing.overlaps(&schedule))
        {
            return Err(ScheduleError::Overlap {
                day_of_week: schedule.day_of_week,
                start: schedule.start_time,
                end: schedule.end_time,
            }
            .into());
        }
        windows.push(schedule);
        Ok(())
    }
}
