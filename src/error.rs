use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::transaction::TransactionStatus;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failures surfaced by the approval engine and the ledger store.
///
/// Everything except `Persistence` is detected before any mutation is staged,
/// so a failed call leaves the ledger untouched. `Persistence` can only occur
/// at commit time and triggers a full rollback of the unit of work.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("transaction is not PENDING (current status: {current})")]
    InvalidState { current: TransactionStatus },
    #[error("insufficient wallet funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("ledger commit failed: {0}")]
    Persistence(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }
}
