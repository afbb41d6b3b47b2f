//! Output formatting helpers for CLI commands

use crate::campaign::{BrandId, CampaignId, InitialState};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

/// View model for one configured campaign
#[derive(Debug, Clone, Serialize)]
pub struct CampaignView {
    pub id: CampaignId,
    pub brand_id: BrandId,
    pub brand: String,
    pub name: String,
    pub daily_budget: Decimal,
    pub monthly_budget: Decimal,
    /// Whether the budgets came from the brand rather than the campaign
    pub inherits_budgets: bool,
    pub initial_state: InitialState,
    pub schedules: usize,
}

fn initial_state_label(state: InitialState) -> String {
    match state {
        InitialState::Active => "active".green().to_string(),
        InitialState::Inactive => "inactive".dimmed().to_string(),
    }
}

/// Format campaigns as a table
pub fn format_campaigns_table(campaigns: &[CampaignView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "ID",
        "Brand",
        "Name",
        "Daily",
        "Monthly",
        "Initial State",
        "Windows",
    ]);

    for c in campaigns {
        let suffix = if c.inherits_budgets { " *" } else { "" };
        let windows = if c.schedules == 0 {
            "always".to_string()
        } else {
            c.schedules.to_string()
        };
        table.add_row(vec![
            Cell::new(c.id),
            Cell::new(format!("{} ({})", c.brand, c.brand_id)),
            Cell::new(&c.name),
            Cell::new(format!("{}{}", c.daily_budget, suffix)),
            Cell::new(format!("{}{}", c.monthly_budget, suffix)),
            Cell::new(initial_state_label(c.initial_state)),
            Cell::new(windows),
        ]);
    }

    table.to_string()
}

/// Format campaigns as JSON
pub fn format_campaigns_json(
    brands: usize,
    campaigns: &[CampaignView],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "brands": brands,
        "campaigns": campaigns,
    }))
}
