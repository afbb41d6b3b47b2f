//! SpendGuard - campaign budget enforcement and dayparting
//!
//! This library ingests spend events, keeps per-campaign daily and monthly
//! spend counters, and pauses or resumes campaigns based on their budgets and
//! time-of-day schedules.

pub mod api;
pub mod campaign;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dayparting;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod logging;
pub mod metrics;
pub mod policy;
pub mod scheduler;
pub mod state_machine;
pub mod store;
