//! # Metrics
//!
//! Prometheus export of enforcement activity, rendered at `GET /metrics`.
//!
//! **Counters:**
//! - `spendguard_transitions_total{from, to}` - Campaign state changes
//! - `spendguard_cycles_total{cycle, outcome}` - Completed cycles (`ok`, `partial`, `skipped`)
//! - `spendguard_cycle_failures_total{cycle}` - Per-campaign failures inside cycles
//! - `spendguard_spend_events_total` - Accepted spend events
//!
//! **Gauges:**
//! - `spendguard_spend_amount_total` - Accepted spend, in currency units (only increases)
//! - `spendguard_campaigns{state}` - Campaigns per run state, refreshed on scrape

pub mod handler;

use crate::campaign::RunState;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub const TRANSITIONS_TOTAL: &str = "spendguard_transitions_total";
pub const CYCLES_TOTAL: &str = "spendguard_cycles_total";
pub const CYCLE_FAILURES_TOTAL: &str = "spendguard_cycle_failures_total";
pub const SPEND_EVENTS_TOTAL: &str = "spendguard_spend_events_total";
pub const SPEND_AMOUNT_TOTAL: &str = "spendguard_spend_amount_total";
pub const CAMPAIGNS: &str = "spendguard_campaigns";

pub fn record_transition(from: &RunState, to: &RunState) {
    metrics::counter!(
        TRANSITIONS_TOTAL,
        "from" => state_label(from),
        "to" => state_label(to)
    )
    .increment(1);
}

pub fn record_cycle(cycle: &'static str, outcome: &'static str) {
    metrics::counter!(CYCLES_TOTAL, "cycle" => cycle, "outcome" => outcome).increment(1);
}

pub fn record_cycle_failure(cycle: &str) {
    metrics::counter!(CYCLE_FAILURES_TOTAL, "cycle" => cycle.to_string()).increment(1);
}

pub fn record_spend(amount: Decimal) {
    metrics::counter!(SPEND_EVENTS_TOTAL).increment(1);
    metrics::gauge!(SPEND_AMOUNT_TOTAL).increment(amount.to_f64().unwrap_or(0.0));
}

/// Publish the per-state campaign counts.
pub fn set_campaign_gauges(active: usize, inactive: usize, paused: usize) {
    metrics::gauge!(CAMPAIGNS, "state" => "active").set(active as f64);
    metrics::gauge!(CAMPAIGNS, "state" => "inactive").set(inactive as f64);
    metrics::gauge!(CAMPAIGNS, "state" => "paused").set(paused as f64);
}

/// Label value for a state: the reason for paused states, the state name otherwise.
pub fn state_label(state: &RunState) -> &'static str {
    match state {
        RunState::Paused(reason) => reason.as_str(),
        other => other.label(),
    }
}

/// Install the global Prometheus recorder.
///
/// Returns a PrometheusHandle that can be used to render metrics.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new().install_recorder()?;
    metrics::describe_counter!(TRANSITIONS_TOTAL, "Campaign state changes");
    metrics::describe_counter!(CYCLES_TOTAL, "Completed enforcement cycles");
    metrics::describe_counter!(CYCLE_FAILURES_TOTAL, "Per-campaign failures inside cycles");
    metrics::describe_counter!(SPEND_EVENTS_TOTAL, "Accepted spend events");
    Ok(handle)
}
