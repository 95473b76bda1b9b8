use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::account::{AccountId, AccountStatus, SavingsAccount, SavingsProduct};
use super::transaction::{NewTransaction, Transaction, TransactionId, TransactionStatus};
use super::user::{User, UserId};
use crate::error::Result;

pub type LedgerRef = Arc<dyn Ledger>;

/// Durable storage for users, savings accounts, products, and the
/// transaction queue.
///
/// The approval engine holds no state of its own; every call operates on
/// ledger records inside a single [`UnitOfWork`]. The snapshot readers exist
/// for reporting and listings only and make no consistency promise beyond
/// reflecting some committed state.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Opens an exclusive write transaction. Implementations must guarantee
    /// that at most one unit of work is open at a time so that concurrent
    /// approvals serialize.
    async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + Send + 'a>>;

    async fn users(&self) -> Result<Vec<User>>;
    async fn savings_accounts(&self) -> Result<Vec<SavingsAccount>>;
    async fn products(&self) -> Result<Vec<SavingsProduct>>;
    async fn transactions(&self) -> Result<Vec<Transaction>>;
}

/// An atomic, all-or-nothing group of reads and writes against the ledger.
///
/// Writes are staged: reads observe the pre-transaction state, and nothing
/// becomes visible to other callers until [`UnitOfWork::commit`]. Dropping a
/// unit of work without committing discards every staged mutation.
pub trait UnitOfWork {
    fn user(&self, id: UserId) -> Option<&User>;
    fn savings_account(&self, id: AccountId) -> Option<&SavingsAccount>;
    fn transaction(&self, id: TransactionId) -> Option<&Transaction>;

    /// Stages a signed balance adjustment on the user's wallet. Refused with
    /// `InsufficientFunds` when the projected balance (including previously
    /// staged adjustments) would go negative.
    fn update_wallet(&mut self, user: UserId, delta: Decimal) -> Result<()>;

    fn update_savings_account_status(
        &mut self,
        account: AccountId,
        status: AccountStatus,
    ) -> Result<()>;

    fn update_transaction_status(
        &mut self,
        tx: TransactionId,
        status: TransactionStatus,
        processed_by: UserId,
    ) -> Result<()>;

    /// Stages a new `PENDING` transaction and returns it with its assigned
    /// identifier and creation timestamp.
    fn insert_transaction(&mut self, new: NewTransaction) -> Result<Transaction>;

    /// Applies every staged mutation. Fails only with `Persistence`, in
    /// which case nothing was applied.
    fn commit(self: Box<Self>) -> Result<()>;
}
