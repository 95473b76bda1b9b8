use rust_decimal::Decimal;

use crate::domain::ports::LedgerRef;
use crate::domain::transaction::{NewTransaction, Transaction};
use crate::domain::user::UserStatus;
use crate::error::{LedgerError, Result};

/// Intake side of the approval queue: customers submit money-movement
/// requests here, and they sit as `PENDING` transactions until staff act on
/// them through the [`ApprovalEngine`](crate::application::engine::ApprovalEngine).
pub struct RequestQueue {
    ledger: LedgerRef,
}

impl RequestQueue {
    pub fn new(ledger: LedgerRef) -> Self {
        Self { ledger }
    }

    /// Validates and enqueues a submission. No balance is touched here;
    /// balances only ever move on approval.
    pub async fn submit(&self, request: NewTransaction) -> Result<Transaction> {
        if request.amount <= Decimal::ZERO {
            return Err(LedgerError::validation("amount must be positive"));
        }

        let mut uow = self.ledger.begin().await?;

        let user = uow
            .user(request.user_id)
            .ok_or_else(|| LedgerError::not_found("user", request.user_id))?;
        if user.status == UserStatus::Locked {
            return Err(LedgerError::validation("user account is locked"));
        }

        if let Some(account_id) = request.account_id {
            let account = uow
                .savings_account(account_id)
                .ok_or_else(|| LedgerError::not_found("savings account", account_id))?;
            if account.user_id != request.user_id {
                return Err(LedgerError::validation(
                    "savings account belongs to another user",
                ));
            }
        }

        let tx = uow.insert_transaction(request)?;
        uow.commit()?;

        tracing::info!(
            transaction = tx.id,
            user = tx.user_id,
            kind = ?tx.kind,
            amount = %tx.amount,
            "transaction request queued"
        );
        Ok(tx)
    }
}
