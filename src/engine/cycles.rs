//! Tick, daily, monthly and full-reset cycles.
//!
//! A cycle fetches the campaign id list once, then processes each campaign in
//! its own critical section with bounded concurrency. A failing campaign is
//! recorded in the report and never stops the rest of the sweep.

use super::{BudgetEngine, EngineError};
use crate::campaign::{CampaignId, PauseReason, RunState};
use crate::events::{BudgetEvent, TransitionEvent};
use crate::state_machine::Trigger;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleKind {
    Tick,
    Daily,
    Monthly,
    FullReset,
}

impl CycleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleKind::Tick => "tick",
            CycleKind::Daily => "daily",
            CycleKind::Monthly => "monthly",
            CycleKind::FullReset => "full_reset",
        }
    }

    pub fn trigger(&self) -> Trigger {
        match self {
            CycleKind::Tick => Trigger::Tick,
            CycleKind::Daily => Trigger::DailyReset,
            CycleKind::Monthly => Trigger::MonthlyReset,
            CycleKind::FullReset => Trigger::FullReset,
        }
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier for a cycle run: `"<cycle>:<YYYY-MM-DD>"` for resets, with the
/// time appended for ticks.
pub fn cycle_id(kind: CycleKind, now: DateTime<Utc>) -> String {
    match kind {
        CycleKind::Tick => format!("tick:{}", now.format("%Y-%m-%dT%H:%M:%SZ")),
        other => format!("{}:{}", other.as_str(), now.format("%Y-%m-%d")),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignFailure {
    pub campaign_id: CampaignId,
    pub error: String,
}

/// What a cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: CycleKind,
    pub cycle_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the cycle declined to run (monthly reset off day 1)
    pub skipped: bool,
    /// Campaigns whose state was evaluated
    pub evaluated: usize,
    pub transitions: Vec<TransitionEvent>,
    pub failures: Vec<CampaignFailure>,
}

impl CycleReport {
    fn empty(cycle: CycleKind, now: DateTime<Utc>) -> Self {
        Self {
            cycle,
            cycle_id: cycle_id(cycle, now),
            started_at: now,
            finished_at: now,
            skipped: false,
            evaluated: 0,
            transitions: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.started_at.date_naive()
    }

    pub fn outcome(&self) -> &'static str {
        if self.skipped {
            "skipped"
        } else if self.failures.is_empty() {
            "ok"
        } else {
            "partial"
        }
    }
}

enum SweepOutcome {
    Skipped,
    Evaluated(Option<TransitionEvent>),
}

impl BudgetEngine {
    /// Evaluate every Active or automatically paused campaign.
    pub async fn run_tick(&self) -> Result<CycleReport, EngineError> {
        self.run_cycle(CycleKind::Tick).await
    }

    /// Zero today's daily counters, then release daily and dayparting pauses
    /// that pass re-evaluation.
    pub async fn run_daily_reset(&self) -> Result<CycleReport, EngineError> {
        self.run_cycle(CycleKind::Daily).await
    }

    /// Zero last month's counters and release monthly pauses that pass
    /// re-evaluation. Does nothing unless today is the 1st (UTC).
    pub async fn run_monthly_reset(&self) -> Result<CycleReport, EngineError> {
        let now = self.clock.now();
        if now.day() != 1 {
            debug!(date = %now.date_naive(), "Monthly reset skipped, not the first of the month");
            let mut report = CycleReport::empty(CycleKind::Monthly, now);
            report.skipped = true;
            self.events
                .emit(BudgetEvent::CycleCompleted(report.clone()));
            return Ok(report);
        }
        self.run_cycle(CycleKind::Monthly).await
    }

    /// Zero both counters of every campaign and release every automatic pause
    /// that passes re-evaluation. Manual pauses stay.
    pub async fn run_full_reset(&self) -> Result<CycleReport, EngineError> {
        self.run_cycle(CycleKind::FullReset).await
    }

    async fn run_cycle(&self, kind: CycleKind) -> Result<CycleReport, EngineError> {
        let now = self.clock.now();
        let mut report = CycleReport::empty(kind, now);

        let ids = match self.store.list_campaign_ids().await {
            Ok(ids) => ids,
            Err(err) => {
                let err = EngineError::from(err);
                self.report_failure(kind.as_str(), Some(&report.cycle_id), None, &err);
                return Err(err);
            }
        };
        debug!(cycle = kind.as_str(), campaigns = ids.len(), "Cycle started");

        let results: Vec<(CampaignId, Result<SweepOutcome, EngineError>)> = stream::iter(ids)
            .map(|id| async move { (id, self.sweep_one(kind, id, now).await) })
            .buffer_unordered(self.sweep_concurrency)
            .collect()
            .await;

        for (campaign_id, result) in results {
            match result {
                Ok(SweepOutcome::Skipped) => {}
                Ok(SweepOutcome::Evaluated(transition)) => {
                    report.evaluated += 1;
                    report.transitions.extend(transition);
                }
                Err(err) => {
                    self.report_failure(
                        kind.as_str(),
                        Some(&report.cycle_id),
                        Some(campaign_id),
                        &err,
                    );
                    report.failures.push(CampaignFailure {
                        campaign_id,
                        error: err.to_string(),
                    });
                }
            }
        }
        report.transitions.sort_by_key(|t| t.campaign_id);
        report.failures.sort_by_key(|f| f.campaign_id);
        report.finished_at = self.clock.now();

        if !report.transitions.is_empty() {
            info!(
                cycle = kind.as_str(),
                transitions = report.transitions.len(),
                "Cycle changed campaign states"
            );
        }
        self.events
            .emit(BudgetEvent::CycleCompleted(report.clone()));
        Ok(report)
    }

    /// One campaign's critical section for a cycle.
    async fn sweep_one(
        &self,
        kind: CycleKind,
        campaign_id: CampaignId,
        now: DateTime<Utc>,
    ) -> Result<SweepOutcome, EngineError> {
        let guard = self.machine.lock(campaign_id).await;
        // Removed between listing and now.
        let Some(mut campaign) = self.store.load_campaign(campaign_id).await? else {
            return Ok(SweepOutcome::Skipped);
        };

        match kind {
            CycleKind::Tick => {}
            CycleKind::Daily => {
                self.ledger.reset_daily(campaign_id, now).await?;
            }
            CycleKind::Monthly => {
                self.ledger.reset_monthly(campaign_id, now).await?;
            }
            CycleKind::FullReset => {
                self.ledger.clear(campaign_id, now).await?;
            }
        }

        let trigger = kind.trigger();
        let eligible = match campaign.state() {
            RunState::Inactive | RunState::Paused(PauseReason::Manual) => false,
            RunState::Active => kind == CycleKind::Tick,
            RunState::Paused(reason) => trigger.releases(reason),
        };
        if !eligible {
            return Ok(SweepOutcome::Skipped);
        }

        let (eval, _) = self.evaluate(&campaign, now).await?;
        let transition = self
            .machine
            .transition(&guard, &mut campaign, trigger, &eval, now)
            .await?;
        Ok(SweepOutcome::Evaluated(transition))
    }
}
