//! Shared test utilities for SpendGuard integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use spendguard::api::{create_router, AppState};
use spendguard::campaign::{BrandId, CampaignId, InitialState};
use spendguard::clock::ManualClock;
use spendguard::config::SpendGuardConfig;
use spendguard::engine::{BudgetEngine, NewBrand, NewCampaign, NewSchedule};
use spendguard::events::EventLog;
use spendguard::store::InMemoryStore;
use std::sync::Arc;

// =============================================================================
// Well-Known Test Constants
// =============================================================================

pub const BRAND: BrandId = 1;

/// Monday 2025-06-09, 12:00 UTC.
pub fn monday_noon() -> DateTime<Utc> {
    at(2025, 6, 9, 12, 0)
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

// =============================================================================
// Engine Builders
// =============================================================================

pub struct TestFleet {
    pub engine: Arc<BudgetEngine>,
    pub clock: Arc<ManualClock>,
    pub events: Arc<EventLog>,
}

/// Engine over an empty store, with one brand (daily 1000, monthly 10000).
pub async fn fleet_at(now: DateTime<Utc>) -> TestFleet {
    let clock = Arc::new(ManualClock::new(now));
    let events = Arc::new(EventLog::new(1000));
    let engine = Arc::new(BudgetEngine::new(
        Arc::new(InMemoryStore::new()),
        clock.clone(),
        events.clone(),
    ));
    engine
        .create_brand(NewBrand {
            id: BRAND,
            name: "Acme".to_string(),
            daily_budget: Decimal::from(1000),
            monthly_budget: Decimal::from(10000),
        })
        .await
        .unwrap();
    TestFleet {
        engine,
        clock,
        events,
    }
}

impl TestFleet {
    /// Add an Active campaign with its own ceilings.
    pub async fn campaign(&self, id: CampaignId, daily: Decimal, monthly: Decimal) {
        self.engine
            .create_campaign(NewCampaign {
                id,
                brand_id: BRAND,
                name: format!("campaign-{}", id),
                daily_budget: Some(daily),
                monthly_budget: Some(monthly),
                initial_state: InitialState::Active,
            })
            .await
            .unwrap();
    }

    pub async fn window(&self, id: CampaignId, day_of_week: u8, start: &str, end: &str) {
        self.schedule(id, day_of_week, start, end, true).await;
    }

    pub async fn schedule(
        &self,
        id: CampaignId,
        day_of_week: u8,
        start: &str,
        end: &str,
        is_active: bool,
    ) {
        self.engine
            .add_schedule(
                id,
                NewSchedule {
                    day_of_week,
                    start: start.to_string(),
                    end: end.to_string(),
                    is_active,
                },
            )
            .await
            .unwrap();
    }

    pub fn router(&self) -> axum::Router {
        let state = AppState::new(
            self.engine.clone(),
            self.events.clone(),
            Arc::new(SpendGuardConfig::default()),
        );
        create_router(Arc::new(state))
    }
}
