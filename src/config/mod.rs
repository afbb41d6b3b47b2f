//! Configuration module for SpendGuard
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SPENDGUARD_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use spendguard::config::SpendGuardConfig;
//!
//! let config = SpendGuardConfig::default();
//! assert_eq!(config.server.port, 8300);
//!
//! let toml = r#"
//! [scheduler]
//! tick_interval_seconds = 30
//! "#;
//! let config: SpendGuardConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.scheduler.tick_interval_seconds, 30);
//! ```

pub mod error;
pub mod fleet;
pub mod logging;
pub mod server;

pub use error::ConfigError;
pub use fleet::{AttentionConfig, BrandEntry, CampaignEntry, ScheduleEntry};
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

pub use crate::scheduler::SchedulerConfig;

use crate::campaign::Budgets;
use crate::dayparting::{parse_time_of_day, DaypartingSchedule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Event history settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Events kept for `GET /v1/events`
    pub history_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            history_capacity: 500,
        }
    }
}

/// Unified configuration for the SpendGuard server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpendGuardConfig {
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
    pub events: EventsConfig,
    pub attention: AttentionConfig,
    pub brands: Vec<BrandEntry>,
    pub campaigns: Vec<CampaignEntry>,
    pub schedules: Vec<ScheduleEntry>,
}

impl SpendGuardConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (the previous value is kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("SPENDGUARD_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SPENDGUARD_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(level) = std::env::var("SPENDGUARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SPENDGUARD_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(interval) = std::env::var("SPENDGUARD_TICK_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.scheduler.tick_interval_seconds = secs;
            }
        }
        if let Ok(enabled) = std::env::var("SPENDGUARD_SCHEDULER") {
            match enabled.to_lowercase().as_str() {
                "true" | "1" => self.scheduler.enabled = true,
                "false" | "0" => self.scheduler.enabled = false,
                _ => {}
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "port must be non-zero",
            ));
        }
        if self.scheduler.tick_interval_seconds == 0 {
            return Err(ConfigError::validation(
                "scheduler.tick_interval_seconds",
                "interval must be positive",
            ));
        }
        if self.scheduler.boundary_check_seconds == 0 {
            return Err(ConfigError::validation(
                "scheduler.boundary_check_seconds",
                "interval must be positive",
            ));
        }
        if self.scheduler.sweep_concurrency == 0 {
            return Err(ConfigError::validation(
                "scheduler.sweep_concurrency",
                "concurrency must be at least 1",
            ));
        }
        if self.events.history_capacity == 0 {
            return Err(ConfigError::validation(
                "events.history_capacity",
                "capacity must be at least 1",
            ));
        }
        if self.attention.daily_headroom < Decimal::ZERO
            || self.attention.monthly_headroom < Decimal::ZERO
        {
            return Err(ConfigError::validation(
                "attention",
                "headroom thresholds cannot be negative",
            ));
        }

        let mut brand_budgets = HashMap::new();
        for (i, brand) in self.brands.iter().enumerate() {
            if brand.name.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("brands[{}].name", i),
                    "name cannot be empty",
                ));
            }
            let budgets = Budgets::new(brand.daily_budget, brand.monthly_budget)
                .map_err(|e| ConfigError::validation(format!("brands[{}]", i), e.to_string()))?;
            if brand_budgets.insert(brand.id, budgets).is_some() {
                return Err(ConfigError::DuplicateId {
                    section: "brands",
                    id: brand.id,
                });
            }
        }

        let mut campaign_ids = HashSet::new();
        for (i, campaign) in self.campaigns.iter().enumerate() {
            if campaign.name.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("campaigns[{}].name", i),
                    "name cannot be empty",
                ));
            }
            let brand = brand_budgets.get(&campaign.brand_id).ok_or_else(|| {
                ConfigError::UnknownReference {
                    field: format!("campaigns[{}].brand_id", i),
                    target: "brand",
                    id: campaign.brand_id,
                }
            })?;
            Budgets::new(
                campaign.daily_budget.unwrap_or(brand.daily()),
                campaign.monthly_budget.unwrap_or(brand.monthly()),
            )
            .map_err(|e| ConfigError::validation(format!("campaigns[{}]", i), e.to_string()))?;
            if !campaign_ids.insert(campaign.id) {
                return Err(ConfigError::DuplicateId {
                    section: "campaigns",
                    id: campaign.id,
                });
            }
        }

        let mut windows: Vec<DaypartingSchedule> = Vec::new();
        for (i, entry) in self.schedules.iter().enumerate() {
            let field = format!("schedules[{}]", i);
            if !campaign_ids.contains(&entry.campaign_id) {
                return Err(ConfigError::UnknownReference {
                    field: format!("{}.campaign_id", field),
                    target: "campaign",
                    id: entry.campaign_id,
                });
            }
            let window = parse_time_of_day(&entry.start)
                .and_then(|start| Ok((start, parse_time_of_day(&entry.end)?)))
                .and_then(|(start, end)| {
                    DaypartingSchedule::new(
                        entry.campaign_id,
                        entry.day_of_week,
                        start,
                        end,
                        entry.active,
                    )
                })
                .map_err(|e| ConfigError::validation(field.clone(), e.to_string()))?;
            if window.is_active
                && windows
                    .iter()
                    .any(|other| other.is_active && other.overlaps(&window))
            {
                return Err(ConfigError::validation(
                    field,
                    "window overlaps another active window on the same day",
                ));
            }
            windows.push(window);
        }

        Ok(())
    }
}
