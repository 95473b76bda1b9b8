use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::domain::account::{AccountId, AccountStatus, ProductId, SavingsAccount, SavingsProduct};
use crate::domain::ports::{Ledger, UnitOfWork};
use crate::domain::transaction::{
    NewTransaction, Transaction, TransactionId, TransactionStatus,
};
use crate::domain::user::{User, UserId};
use crate::error::{LedgerError, Result};

/// The full record set behind the ledger. Kept as one value so that a single
/// lock covers every row touched by a unit of work.
#[derive(Debug, Default, Clone)]
pub struct LedgerState {
    pub users: HashMap<UserId, User>,
    pub accounts: HashMap<AccountId, SavingsAccount>,
    pub products: HashMap<ProductId, SavingsProduct>,
    pub transactions: HashMap<TransactionId, Transaction>,
}

/// A staged write. Validated against the locked state when staged, applied
/// in order on commit.
#[derive(Debug, Clone)]
enum Mutation {
    AdjustWallet {
        user: UserId,
        delta: Decimal,
    },
    SetAccountStatus {
        account: AccountId,
        status: AccountStatus,
    },
    SetTransactionStatus {
        tx: TransactionId,
        status: TransactionStatus,
        processed_by: UserId,
    },
    InsertTransaction(Transaction),
}

/// In-memory reference implementation of the [`Ledger`] port.
///
/// The whole [`LedgerState`] sits behind one `tokio::sync::RwLock`; holding
/// the write guard for the duration of a unit of work is the
/// transaction-level lock that serializes concurrent approvals. The second
/// of two racing approvals of the same transaction necessarily observes the
/// terminal status the first one committed.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + Send + 'a>> {
        Ok(Box::new(InMemoryUnitOfWork {
            state: self.state.write().await,
            pending: Vec::new(),
        }))
    }

    async fn users(&self) -> Result<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn savings_accounts(&self) -> Result<Vec<SavingsAccount>> {
        Ok(self.state.read().await.accounts.values().cloned().collect())
    }

    async fn products(&self) -> Result<Vec<SavingsProduct>> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self
            .state
            .read()
            .await
            .transactions
            .values()
            .cloned()
            .collect())
    }
}

pub struct InMemoryUnitOfWork<'a> {
    state: RwLockWriteGuard<'a, LedgerState>,
    pending: Vec<Mutation>,
}

impl InMemoryUnitOfWork<'_> {
    /// Wallet balance as it will be after the already-staged adjustments.
    fn projected_wallet(&self, user: UserId) -> Option<Decimal> {
        let current = self.state.users.get(&user)?.wallet_balance;
        let staged: Decimal = self
            .pending
            .iter()
            .filter_map(|m| match m {
                Mutation::AdjustWallet { user: u, delta } if *u == user => Some(*delta),
                _ => None,
            })
            .sum();
        Some(current + staged)
    }

    fn next_transaction_id(&self) -> TransactionId {
        let committed = self.state.transactions.keys().copied().max().unwrap_or(0);
        let staged = self
            .pending
            .iter()
            .filter_map(|m| match m {
                Mutation::InsertTransaction(tx) => Some(tx.id),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        committed.max(staged) + 1
    }
}

impl UnitOfWork for InMemoryUnitOfWork<'_> {
    fn user(&self, id: UserId) -> Option<&User> {
        self.state.users.get(&id)
    }

    fn savings_account(&self, id: AccountId) -> Option<&SavingsAccount> {
        self.state.accounts.get(&id)
    }

    fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.state.transactions.get(&id)
    }

    fn update_wallet(&mut self, user: UserId, delta: Decimal) -> Result<()> {
        let projected = self
            .projected_wallet(user)
            .ok_or_else(|| LedgerError::not_found("user", user))?;
        if projected + delta < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds {
                required: -delta,
                available: projected,
            });
        }
        self.pending.push(Mutation::AdjustWallet { user, delta });
        Ok(())
    }

    fn update_savings_account_status(
        &mut self,
        account: AccountId,
        status: AccountStatus,
    ) -> Result<()> {
        if !self.state.accounts.contains_key(&account) {
            return Err(LedgerError::not_found("savings account", account));
        }
        self.pending
            .push(Mutation::SetAccountStatus { account, status });
        Ok(())
    }

    fn update_transaction_status(
        &mut self,
        tx: TransactionId,
        status: TransactionStatus,
        processed_by: UserId,
    ) -> Result<()> {
        if !self.state.transactions.contains_key(&tx) {
            return Err(LedgerError::not_found("transaction", tx));
        }
        self.pending.push(Mutation::SetTransactionStatus {
            tx,
            status,
            processed_by,
        });
        Ok(())
    }

    fn insert_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        if !self.state.users.contains_key(&new.user_id) {
            return Err(LedgerError::not_found("user", new.user_id));
        }
        let tx = Transaction {
            id: self.next_transaction_id(),
            user_id: new.user_id,
            account_id: new.account_id,
            amount: new.amount,
            kind: new.kind,
            status: TransactionStatus::Pending,
            processed_by: None,
            created_at: Utc::now(),
        };
        self.pending.push(Mutation::InsertTransaction(tx.clone()));
        Ok(tx)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        // Two phases: re-verify every target against the locked state, then
        // apply. Phase one failing means nothing was touched, which is the
        // all-or-nothing contract of the port.
        for mutation in &self.pending {
            match mutation {
                Mutation::AdjustWallet { user, delta: _ } => {
                    if !self.state.users.contains_key(user) {
                        return Err(LedgerError::Persistence(format!(
                            "user {user} vanished before commit"
                        )));
                    }
                }
                Mutation::SetAccountStatus { account, .. } => {
                    if !self.state.accounts.contains_key(account) {
                        return Err(LedgerError::Persistence(format!(
                            "savings account {account} vanished before commit"
                        )));
                    }
                }
                Mutation::SetTransactionStatus { tx, .. } => {
                    if !self.state.transactions.contains_key(tx) {
                        return Err(LedgerError::Persistence(format!(
                            "transaction {tx} vanished before commit"
                        )));
                    }
                }
                Mutation::InsertTransaction(tx) => {
                    if self.state.transactions.contains_key(&tx.id) {
                        return Err(LedgerError::Persistence(format!(
                            "transaction id {} already taken",
                            tx.id
                        )));
                    }
                }
            }
        }

        for mutation in std::mem::take(&mut self.pending) {
            match mutation {
                Mutation::AdjustWallet { user, delta } => {
                    // Presence verified above; staging verified the balance.
                    if let Some(u) = self.state.users.get_mut(&user) {
                        if delta >= Decimal::ZERO {
                            u.credit_wallet(delta);
                        } else {
                            u.debit_wallet(-delta).map_err(|_| {
                                LedgerError::Persistence(format!(
                                    "wallet of user {user} would go negative"
                                ))
                            })?;
                        }
                    }
                }
                Mutation::SetAccountStatus { account, status } => {
                    if let Some(a) = self.state.accounts.get_mut(&account) {
                        a.status = status;
                    }
                }
                Mutation::SetTransactionStatus {
                    tx,
                    status,
                    processed_by,
                } => {
                    if let Some(t) = self.state.transactions.get_mut(&tx) {
                        t.status = status;
                        t.processed_by = Some(processed_by);
                    }
                }
                Mutation::InsertTransaction(tx) => {
                    self.state.transactions.insert(tx.id, tx);
                }
            }
        }
        Ok(())
    }
}
