//! Background enforcement loops.
//!
//! Three loops run side by side until cancelled:
//! - the tick loop runs [`BudgetEngine::run_tick`] on a fixed interval;
//! - the daily loop polls the engine's clock and runs the daily reset when
//!   the UTC date changes;
//! - the monthly loop polls the same clock and runs the monthly reset on the
//!   1st, once that date's daily reset is done.
//!
//! A cycle that has started always finishes; cancellation is only observed
//! between cycles.

mod config;

pub use config::SchedulerConfig;

use crate::engine::{BudgetEngine, CycleKind, CycleReport};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Remembers the last date each date-bound cycle ran for, so one date never
/// fires the same cycle twice.
#[derive(Debug, Default)]
pub struct CycleGuard {
    ran: Mutex<HashMap<CycleKind, NaiveDate>>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard that treats `date` as already handled for every cycle.
    pub fn starting_at(date: NaiveDate) -> Self {
        let guard = Self::new();
        guard.mark(CycleKind::Daily, date);
        guard.mark(CycleKind::Monthly, date);
        guard
    }

    /// Whether `kind` still has to run for `date`.
    pub fn is_due(&self, kind: CycleKind, date: NaiveDate) -> bool {
        let ran = self.ran.lock().unwrap_or_else(|e| e.into_inner());
        !ran.get(&kind).is_some_and(|last| *last >= date)
    }

    pub fn mark(&self, kind: CycleKind, date: NaiveDate) {
        let mut ran = self.ran.lock().unwrap_or_else(|e| e.into_inner());
        ran.insert(kind, date);
    }

    pub fn last_run(&self, kind: CycleKind) -> Option<NaiveDate> {
        let ran = self.ran.lock().unwrap_or_else(|e| e.into_inner());
        ran.get(&kind).copied()
    }
}

pub struct Scheduler {
    engine: Arc<BudgetEngine>,
    config: SchedulerConfig,
    guard: CycleGuard,
}

impl Scheduler {
    /// Create a scheduler. The current date counts as handled, so starting up
    /// never triggers a reset by itself.
    pub fn new(engine: Arc<BudgetEngine>, config: SchedulerConfig) -> Self {
        let today = engine.clock().now().date_naive();
        Self {
            engine,
            config,
            guard: CycleGuard::starting_at(today),
        }
    }

    pub fn guard(&self) -> &CycleGuard {
        &self.guard
    }

    /// Run whichever date-bound cycles are due for the clock's current date,
    /// daily first.
    pub async fn check_boundary(&self) -> Vec<CycleReport> {
        let mut reports = Vec::new();
        reports.extend(self.check_daily().await);
        reports.extend(self.check_monthly().await);
        reports
    }

    /// Run the daily reset if the date changed since it last ran.
    ///
    /// A reset that fails outright stays due and is retried on the next call.
    pub async fn check_daily(&self) -> Option<CycleReport> {
        let today = self.engine.clock().now().date_naive();
        if !self.guard.is_due(CycleKind::Daily, today) {
            return None;
        }
        match self.engine.run_daily_reset().await {
            Ok(report) => {
                self.guard.mark(CycleKind::Daily, today);
                Some(report)
            }
            Err(e) => {
                tracing::error!(date = %today, error = %e, "Daily reset failed, will retry");
                None
            }
        }
    }

    /// Run the monthly reset on the 1st, after that date's daily reset.
    pub async fn check_monthly(&self) -> Option<CycleReport> {
        let today = self.engine.clock().now().date_naive();
        if today.day() != 1 || !self.guard.is_due(CycleKind::Monthly, today) {
            return None;
        }
        if self.guard.is_due(CycleKind::Daily, today) {
            tracing::debug!(date = %today, "Monthly reset waiting for the daily reset");
            return None;
        }
        match self.engine.run_monthly_reset().await {
            Ok(report) => {
                self.guard.mark(CycleKind::Monthly, today);
                Some(report)
            }
            Err(e) => {
                tracing::error!(date = %today, error = %e, "Monthly reset failed, will retry");
                None
            }
        }
    }

    /// Spawn the tick, daily and monthly loops.
    ///
    /// The returned handle completes once every loop has observed
    /// cancellation and finished any cycle in progress.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        let scheduler = Arc::new(self);
        tokio::spawn(async move {
            tracing::info!(
                tick_interval_seconds = scheduler.config.tick_interval_seconds,
                boundary_check_seconds = scheduler.config.boundary_check_seconds,
                "Scheduler started"
            );
            let tick = tokio::spawn(Arc::clone(&scheduler).tick_loop(cancel_token.clone()));
            let daily = tokio::spawn(
                Arc::clone(&scheduler).boundary_loop(CycleKind::Daily, cancel_token.clone()),
            );
            let monthly = tokio::spawn(
                Arc::clone(&scheduler).boundary_loop(CycleKind::Monthly, cancel_token),
            );
            let (tick, daily, monthly) = tokio::join!(tick, daily, monthly);
            if let Err(e) = tick.and(daily).and(monthly) {
                tracing::error!(error = %e, "Scheduler loop panicked");
            }
            tracing::info!("Scheduler stopped");
        })
    }

    async fn tick_loop(self: Arc<Self>, cancel_token: CancellationToken) {
        let mut interval = tokio::time::interval(Duration::from_secs(
            self.config.tick_interval_seconds.max(1),
        ));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::debug!("Tick loop shutting down");
                    break;
                }
                _ = interval.tick() => {
                    match self.engine.run_tick().await {
                        Ok(report) => tracing::debug!(
                            evaluated = report.evaluated,
                            transitions = report.transitions.len(),
                            "Tick completed"
                        ),
                        Err(e) => tracing::error!(error = %e, "Tick failed"),
                    }
                }
            }
        }
    }

    /// Poll the clock for one date-bound cycle.
    async fn boundary_loop(self: Arc<Self>, kind: CycleKind, cancel_token: CancellationToken) {
        let mut interval = tokio::time::interval(Duration::from_secs(
            self.config.boundary_check_seconds.max(1),
        ));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::debug!(cycle = %kind, "Boundary loop shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let report = match kind {
                        CycleKind::Monthly => self.check_monthly().await,
                        _ => self.check_daily().await,
                    };
                    if let Some(report) = report {
                        tracing::debug!(
                            cycle_id = %report.cycle_id,
                            transitions = report.transitions.len(),
                            "Boundary cycle completed"
                        );
                    }
                }
            }
        }
    }
}
