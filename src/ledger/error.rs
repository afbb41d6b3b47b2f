use crate::store::StoreError;
use rust_decimal::Decimal;

/// Errors that can occur during ledger operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    #[error("spend amount must be non-negative, got {0}")]
    InvalidAmount(Decimal),

    #[error(transparent)]
    Store(#[from] StoreError),
}
