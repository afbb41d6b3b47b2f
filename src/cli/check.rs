//! Check command implementation

use crate::cli::output::{format_campaigns_json, format_campaigns_table, CampaignView};
use crate::cli::CheckArgs;
use crate::config::SpendGuardConfig;
use colored::Colorize;
use std::collections::HashMap;

/// Resolve each configured campaign against its brand.
///
/// Expects a config that already passed `validate`.
pub fn campaign_views(config: &SpendGuardConfig) -> Vec<CampaignView> {
    let brands: HashMap<_, _> = config.brands.iter().map(|b| (b.id, b)).collect();
    let mut schedules: HashMap<_, usize> = HashMap::new();
    for entry in &config.schedules {
        *schedules.entry(entry.campaign_id).or_default() += 1;
    }

    config
        .campaigns
        .iter()
        .filter_map(|c| {
            let brand = brands.get(&c.brand_id)?;
            Some(CampaignView {
                id: c.id,
                brand_id: c.brand_id,
                brand: brand.name.clone(),
                name: c.name.clone(),
                daily_budget: c.daily_budget.unwrap_or(brand.daily_budget),
                monthly_budget: c.monthly_budget.unwrap_or(brand.monthly_budget),
                inherits_budgets: c.daily_budget.is_none() || c.monthly_budget.is_none(),
                initial_state: c.initial_state,
                schedules: schedules.get(&c.id).copied().unwrap_or(0),
            })
        })
        .collect()
}

/// Handle `spendguard check` command
///
/// Returns the rendered fleet; a missing or invalid file is an error.
pub fn handle_check(args: &CheckArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = SpendGuardConfig::load(Some(&args.config))?;
    config.validate()?;

    let views = campaign_views(&config);
    if args.json {
        return Ok(format_campaigns_json(config.brands.len(), &views)?);
    }

    let mut output = format!(
        "{} {} ({} brands, {} campaigns, {} windows)\n",
        "✓".green(),
        args.config.display(),
        config.brands.len(),
        views.len(),
        config.schedules.len()
    );
    if !views.is_empty() {
        output.push_str(&format_campaigns_table(&views));
        output.push_str("\n* inherited from the brand");
    }
    Ok(output)
}
