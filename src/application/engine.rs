use crate::domain::account::AccountStatus;
use crate::domain::ports::LedgerRef;
use crate::domain::transaction::{TransactionId, TransactionKind, TransactionStatus};
use crate::domain::user::UserId;
use crate::error::{LedgerError, Result};

/// The transaction approval state machine.
///
/// `ApprovalEngine` owns no state of its own; each call opens one unit of
/// work on the injected ledger, validates against the locked state, and
/// commits the staged balance mutation. Validation order is fixed (existence,
/// then status, then funds) and the first failure wins with nothing staged.
/// The unit-of-work lock is what serializes two racing calls on the same
/// transaction: the loser re-reads a terminal status and fails with
/// `InvalidState`.
///
/// Callers must have already been authorized with staff capability; the
/// acting identity is only recorded as `processed_by`.
pub struct ApprovalEngine {
    ledger: LedgerRef,
}

impl ApprovalEngine {
    pub fn new(ledger: LedgerRef) -> Self {
        Self { ledger }
    }

    /// Approves a pending transaction and applies its balance mutation.
    pub async fn approve(&self, tx_id: TransactionId, acting_staff: UserId) -> Result<()> {
        let mut uow = self.ledger.begin().await?;

        let tx = uow
            .transaction(tx_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found("transaction", tx_id))?;
        if tx.status != TransactionStatus::Pending {
            return Err(LedgerError::InvalidState { current: tx.status });
        }

        match tx.kind {
            TransactionKind::DepositToWallet => {
                uow.update_wallet(tx.user_id, tx.amount)?;
            }
            TransactionKind::WithdrawFromWallet | TransactionKind::OpenSavings => {
                let user = uow
                    .user(tx.user_id)
                    .ok_or_else(|| LedgerError::not_found("user", tx.user_id))?;
                if user.wallet_balance < tx.amount {
                    return Err(LedgerError::InsufficientFunds {
                        required: tx.amount,
                        available: user.wallet_balance,
                    });
                }
                uow.update_wallet(tx.user_id, -tx.amount)?;
            }
            TransactionKind::CloseSavings => {
                uow.update_wallet(tx.user_id, tx.amount)?;
                if let Some(account_id) = tx.account_id {
                    uow.update_savings_account_status(account_id, AccountStatus::Closed)?;
                }
            }
        }

        uow.update_transaction_status(tx_id, TransactionStatus::Approved, acting_staff)?;
        uow.commit()?;

        tracing::info!(
            transaction = tx_id,
            staff = acting_staff,
            kind = ?tx.kind,
            amount = %tx.amount,
            "transaction approved"
        );
        Ok(())
    }

    /// Rejects a pending transaction. No wallet is ever touched; a linked
    /// provisional savings account on an `OpenSavings` request is closed as
    /// compensation.
    pub async fn reject(&self, tx_id: TransactionId, acting_staff: UserId) -> Result<()> {
        let mut uow = self.ledger.begin().await?;

        let tx = uow
            .transaction(tx_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found("transaction", tx_id))?;
        if tx.status != TransactionStatus::Pending {
            return Err(LedgerError::InvalidState { current: tx.status });
        }

        uow.update_transaction_status(tx_id, TransactionStatus::Rejected, acting_staff)?;
        if tx.kind == TransactionKind::OpenSavings
            && let Some(account_id) = tx.account_id
        {
            uow.update_savings_account_status(account_id, AccountStatus::Closed)?;
        }
        uow.commit()?;

        tracing::info!(
            transaction = tx_id,
            staff = acting_staff,
            kind = ?tx.kind,
            "transaction rejected"
        );
        Ok(())
    }
}
