use rust_decimal::Decimal;

/// Errors raised while building campaign domain values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CampaignError {
    #[error("{field} must be positive, got {value}")]
    InvalidBudget { field: &'static str, value: Decimal },

    #[error("campaign name cannot be empty")]
    EmptyName,
}
