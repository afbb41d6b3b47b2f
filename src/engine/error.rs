use crate::campaign::{BrandId, CampaignError, CampaignId};
use crate::dayparting::ScheduleError;
use crate::ledger::LedgerError;
use crate::state_machine::{InvalidTransition, OperateError};
use crate::store::StoreError;
use rust_decimal::Decimal;

/// Errors surfaced by [`super::BudgetEngine`] operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("spend amount must be non-negative, got {0}")]
    InvalidAmount(Decimal),

    #[error("campaign not found: {0}")]
    UnknownCampaign(CampaignId),

    #[error("brand not found: {0}")]
    UnknownBrand(BrandId),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("invalid campaign: {0}")]
    InvalidCampaign(String),

    #[error("campaign already exists: {0}")]
    DuplicateCampaign(CampaignId),

    #[error("brand already exists: {0}")]
    DuplicateBrand(BrandId),

    #[error(transparent)]
    InvalidSchedule(#[from] ScheduleError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => EngineError::StoreUnavailable(message),
            StoreError::Duplicate { kind: "brand", id } => EngineError::DuplicateBrand(id),
            StoreError::Duplicate { id, .. } => EngineError::DuplicateCampaign(id),
            StoreError::Missing { kind: "brand", id } => EngineError::UnknownBrand(id),
            StoreError::Missing { id, .. } => EngineError::UnknownCampaign(id),
            StoreError::Schedule(err) => EngineError::InvalidSchedule(err),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAmount(amount) => EngineError::InvalidAmount(amount),
            LedgerError::Store(err) => err.into(),
        }
    }
}

impl From<OperateError> for EngineError {
    fn from(err: OperateError) -> Self {
        match err {
            OperateError::Invalid(err) => EngineError::InvalidTransition(err),
            OperateError::Store(err) => err.into(),
        }
    }
}

impl From<CampaignError> for EngineError {
    fn from(err: CampaignError) -> Self {
        EngineError::InvalidCampaign(err.to_string())
    }
}

impl EngineError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable(_))
    }
}
