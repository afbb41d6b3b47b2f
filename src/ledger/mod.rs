//! Per-campaign spend accumulator.
//!
//! One [`SpendEntry`] exists per (campaign, UTC date). `monthly_spend` on an
//! entry is month-to-date including that day. A fresh entry starts its daily
//! counter at zero and carries the monthly counter only from the most recent
//! earlier entry in the same calendar month, so spend never leaks across a
//! month boundary no matter when the monthly reset runs.
//!
//! The ledger trusts its caller: it does not guard resets by date and does no
//! locking. [`crate::engine::BudgetEngine`] calls it inside the per-campaign
//! critical section.

mod error;

pub use error::*;

use crate::campaign::CampaignId;
use crate::store::CampaignStore;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stored spend row for one campaign on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendEntry {
    pub campaign_id: CampaignId,
    pub date: NaiveDate,
    pub daily_spend: Decimal,
    pub monthly_spend: Decimal,
    /// Spend events applied to this row
    pub events: u64,
    pub updated_at: DateTime<Utc>,
}

impl SpendEntry {
    fn empty(campaign_id: CampaignId, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            campaign_id,
            date,
            daily_spend: Decimal::ZERO,
            monthly_spend: Decimal::ZERO,
            events: 0,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> SpendSnapshot {
        SpendSnapshot {
            daily_spend: self.daily_spend,
            monthly_spend: self.monthly_spend,
        }
    }
}

/// Counters as seen at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendSnapshot {
    pub daily_spend: Decimal,
    pub monthly_spend: Decimal,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub struct Ledger {
    store: Arc<dyn CampaignStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Load the entry for `date`, or build the one that would be created
    /// there, carrying month-to-date spend from earlier in the same month.
    async fn entry_for(
        &self,
        campaign_id: CampaignId,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<SpendEntry, LedgerError> {
        if let Some(entry) = self.store.load_spend(campaign_id, date).await? {
            return Ok(entry);
        }
        let mut entry = SpendEntry::empty(campaign_id, date, now);
        if let Some(previous) = self.store.latest_spend_before(campaign_id, date).await? {
            if same_month(previous.date, date) {
                entry.monthly_spend = previous.monthly_spend;
            }
        }
        Ok(entry)
    }

    /// Apply a spend event and return the post-update counters.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` for a negative amount; nothing is
    /// written in that case.
    pub async fn record_spend(
        &self,
        campaign_id: CampaignId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<SpendSnapshot, LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let date = now.date_naive();
        let mut entry = self.entry_for(campaign_id, date, now).await?;

        entry.daily_spend += amount;
        if date.day() == 1 && entry.events == 0 {
            // First event of the month seeds the monthly counter.
            entry.monthly_spend = amount;
        } else {
            entry.monthly_spend += amount;
        }
        entry.events += 1;
        entry.updated_at = now;

        self.store.save_spend(&entry).await?;
        Ok(entry.snapshot())
    }

    /// Current counters without writing anything.
    pub async fn snapshot(
        &self,
        campaign_id: CampaignId,
        now: DateTime<Utc>,
    ) -> Result<SpendSnapshot, LedgerError> {
        let entry = self.entry_for(campaign_id, now.date_naive(), now).await?;
        Ok(entry.snapshot())
    }

    /// Zero today's daily counter. Idempotent.
    pub async fn reset_daily(
        &self,
        campaign_id: CampaignId,
        now: DateTime<Utc>,
    ) -> Result<SpendSnapshot, LedgerError> {
        let date = now.date_naive();
        match self.store.load_spend(campaign_id, date).await? {
            Some(mut entry) => {
                if !entry.daily_spend.is_zero() {
                    entry.daily_spend = Decimal::ZERO;
                    entry.updated_at = now;
                    self.store.save_spend(&entry).await?;
                }
                Ok(entry.snapshot())
            }
            None => self.snapshot(campaign_id, now).await,
        }
    }

    /// Zero the monthly counter on every entry that belongs to an earlier
    /// month than `now`. Spend already recorded in the current month is kept.
    pub async fn reset_monthly(
        &self,
        campaign_id: CampaignId,
        now: DateTime<Utc>,
    ) -> Result<SpendSnapshot, LedgerError> {
        let month_start = first_of_month(now.date_naive());
        for mut entry in self.store.list_spend(campaign_id).await? {
            if entry.date < month_start && !entry.monthly_spend.is_zero() {
                entry.monthly_spend = Decimal::ZERO;
                entry.updated_at = now;
                self.store.save_spend(&entry).await?;
            }
        }
        self.snapshot(campaign_id, now).await
    }

    /// Zero both counters on every entry of the campaign.
    pub async fn clear(
        &self,
        campaign_id: CampaignId,
        now: DateTime<Utc>,
    ) -> Result<SpendSnapshot, LedgerError> {
        for mut entry in self.store.list_spend(campaign_id).await? {
            if !entry.daily_spend.is_zero() || !entry.monthly_spend.is_zero() {
                entry.daily_spend = Decimal::ZERO;
                entry.monthly_spend = Decimal::ZERO;
                entry.updated_at = now;
                self.store.save_spend(&entry).await?;
            }
        }
        Ok(SpendSnapshot::default())
    }
}
