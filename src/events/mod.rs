//! Event sink for state transitions, cycle completions and failures.
//!
//! [`EventLog`] is the sink `serve` runs with: it logs each event, bumps the
//! matching Prometheus counters and keeps the most recent events in a ring
//! buffer for `GET /v1/events`.

use crate::campaign::{CampaignId, PauseReason, RunState};
use crate::engine::CycleReport;
use crate::state_machine::Trigger;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

/// A campaign moved from one state to another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionEvent {
    pub id: Uuid,
    pub campaign_id: CampaignId,
    pub from: RunState,
    pub to: RunState,
    pub cause: Trigger,
    /// Pause reason of the new state, if paused
    pub reason: Option<PauseReason>,
    pub timestamp: DateTime<Utc>,
}

impl TransitionEvent {
    pub fn new(
        campaign_id: CampaignId,
        from: RunState,
        to: RunState,
        cause: Trigger,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            from,
            to,
            cause,
            reason: to.pause_reason(),
            timestamp,
        }
    }
}

/// An operation that failed and will be retried on its next scheduled run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationFailure {
    /// `record_spend` or the cycle name
    pub operation: String,
    pub cycle_id: Option<String>,
    pub campaign_id: Option<CampaignId>,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BudgetEvent {
    Transition(TransitionEvent),
    CycleCompleted(CycleReport),
    OperationFailed(OperationFailure),
}

impl BudgetEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            BudgetEvent::Transition(_) => "transition",
            BudgetEvent::CycleCompleted(_) => "cycle_completed",
            BudgetEvent::OperationFailed(_) => "operation_failed",
        }
    }
}

/// Receives engine events. Must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: BudgetEvent);
}

/// Logs, counts and retains the most recent events.
pub struct EventLog {
    entries: RwLock<VecDeque<BudgetEvent>>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Up to `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<BudgetEvent> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, event: BudgetEvent) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(event);
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(500)
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: BudgetEvent) {
        match &event {
            BudgetEvent::Transition(t) => {
                crate::metrics::record_transition(&t.from, &t.to);
            }
            BudgetEvent::CycleCompleted(report) => {
                info!(
                    cycle = report.cycle.as_str(),
                    cycle_id = %report.cycle_id,
                    outcome = report.outcome(),
                    evaluated = report.evaluated,
                    transitions = report.transitions.len(),
                    failures = report.failures.len(),
                    "Cycle completed"
                );
                crate::metrics::record_cycle(report.cycle.as_str(), report.outcome());
            }
            BudgetEvent::OperationFailed(failure) => {
                match failure.campaign_id {
                    Some(campaign_id) => warn!(
                        operation = %failure.operation,
                        campaign_id,
                        error = %failure.error,
                        "Operation failed for campaign"
                    ),
                    None => error!(
                        operation = %failure.operation,
                        error = %failure.error,
                        "Operation failed"
                    ),
                }
                if failure.cycle_id.is_some() {
                    crate::metrics::record_cycle_failure(&failure.operation);
                }
            }
        }
        self.push(event);
    }
}
