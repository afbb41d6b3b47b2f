//! Budget limit evaluation.

use crate::campaign::{Budgets, PauseReason};
use crate::ledger::SpendSnapshot;
use serde::{Deserialize, Serialize};

/// Outcome of checking spend against a campaign's ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStatus {
    WithinLimits,
    DailyExceeded,
    MonthlyExceeded,
}

impl LimitStatus {
    /// The pause reason this outcome calls for, if any.
    pub fn pause_reason(&self) -> Option<PauseReason> {
        match self {
            LimitStatus::WithinLimits => None,
            LimitStatus::DailyExceeded => Some(PauseReason::DailyBudgetExceeded),
            LimitStatus::MonthlyExceeded => Some(PauseReason::MonthlyBudgetExceeded),
        }
    }

    pub fn is_within(&self) -> bool {
        matches!(self, LimitStatus::WithinLimits)
    }
}

/// Compare a snapshot against the ceilings. Reaching a ceiling counts as
/// exceeding it, and the daily ceiling wins when both are reached.
pub fn evaluate(budgets: &Budgets, snapshot: &SpendSnapshot) -> LimitStatus {
    if snapshot.daily_spend >= budgets.daily() {
        LimitStatus::DailyExceeded
    } else if snapshot.monthly_spend >= budgets.monthly() {
        LimitStatus::MonthlyExceeded
    } else {
        LimitStatus::WithinLimits
    }
}
