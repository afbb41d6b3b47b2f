//! Configuration for the enforcement scheduler.

use serde::{Deserialize, Serialize};

/// Timing of the tick and boundary loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Whether `serve` starts the background loops
    pub enabled: bool,
    /// Seconds between tick cycles
    pub tick_interval_seconds: u64,
    /// Seconds between checks for a UTC date change
    pub boundary_check_seconds: u64,
    /// Campaigns processed concurrently within one sweep
    pub sweep_concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_seconds: 60,
            boundary_check_seconds: 1,
            sweep_concurrency: 16,
        }
    }
}
