use std::collections::HashSet;
use std::io::Read;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::account::{SavingsAccount, SavingsProduct};
use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::domain::user::User;
use crate::error::{LedgerError, Result};
use crate::infrastructure::in_memory::LedgerState;

/// Bootstrap data for the in-memory ledger, read from a JSON file at
/// startup. Token issuance lives outside this service; the seed carries the
/// already-issued bearer tokens the static authorizer recognizes.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub products: Vec<SavingsProduct>,
    #[serde(default)]
    pub accounts: Vec<SavingsAccount>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedUser {
    #[serde(flatten)]
    pub user: User,
    /// Bearer token this user authenticates with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub products: usize,
    pub accounts: usize,
    pub transactions: usize,
    pub pending: usize,
}

impl Seed {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| LedgerError::validation(format!("malformed seed: {e}")))
    }

    /// Referential and invariant checks over the raw seed, so that a bad
    /// file is refused before anything reaches the ledger.
    pub fn validate(&self) -> Result<()> {
        let mut user_ids = HashSet::new();
        for entry in &self.users {
            let u = &entry.user;
            if !user_ids.insert(u.id) {
                return Err(LedgerError::validation(format!("duplicate user id {}", u.id)));
            }
            if u.wallet_balance < Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "user {} has a negative wallet balance",
                    u.id
                )));
            }
        }

        let mut product_ids = HashSet::new();
        for p in &self.products {
            if !product_ids.insert(p.id) {
                return Err(LedgerError::validation(format!(
                    "duplicate product id {}",
                    p.id
                )));
            }
        }

        let mut account_ids = HashSet::new();
        for a in &self.accounts {
            if !account_ids.insert(a.id) {
                return Err(LedgerError::validation(format!(
                    "duplicate savings account id {}",
                    a.id
                )));
            }
            if a.principal_balance < Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "savings account {} has a negative principal",
                    a.id
                )));
            }
            if !user_ids.contains(&a.user_id) {
                return Err(LedgerError::validation(format!(
                    "savings account {} references unknown user {}",
                    a.id, a.user_id
                )));
            }
            if !product_ids.contains(&a.product_id) {
                return Err(LedgerError::validation(format!(
                    "savings account {} references unknown product {}",
                    a.id, a.product_id
                )));
            }
        }

        let mut tx_ids = HashSet::new();
        for t in &self.transactions {
            if !tx_ids.insert(t.id) {
                return Err(LedgerError::validation(format!(
                    "duplicate transaction id {}",
                    t.id
                )));
            }
            if t.amount <= Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "transaction {} has a non-positive amount",
                    t.id
                )));
            }
            if !user_ids.contains(&t.user_id) {
                return Err(LedgerError::validation(format!(
                    "transaction {} references unknown user {}",
                    t.id, t.user_id
                )));
            }
            if let Some(account_id) = t.account_id
                && !account_ids.contains(&account_id)
            {
                return Err(LedgerError::validation(format!(
                    "transaction {} references unknown savings account {}",
                    t.id, account_id
                )));
            }
        }

        Ok(())
    }

    pub fn summary(&self) -> SeedSummary {
        SeedSummary {
            users: self.users.len(),
            products: self.products.len(),
            accounts: self.accounts.len(),
            transactions: self.transactions.len(),
            pending: self
                .transactions
                .iter()
                .filter(|t| t.status == TransactionStatus::Pending)
                .count(),
        }
    }

    pub fn into_state(self) -> LedgerState {
        let mut state = LedgerState::default();
        for entry in self.users {
            state.users.insert(entry.user.id, entry.user);
        }
        for p in self.products {
            state.products.insert(p.id, p);
        }
        for a in self.accounts {
            state.accounts.insert(a.id, a);
        }
        for t in self.transactions {
            state.transactions.insert(t.id, t);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"{
        "users": [
            {
                "id": 1,
                "email": "alice@example.com",
                "full_name": "Alice",
                "role": "CUSTOMER",
                "wallet_balance": "100.00",
                "status": "ACTIVE",
                "created_at": "2026-01-02T10:00:00Z",
                "api_token": "alice-token"
            }
        ],
        "products": [
            {
                "id": 1,
                "name": "6-month fixed",
                "term_months": 6,
                "interest_rate": "4.5",
                "min_days_hold": 30,
                "is_active": true
            }
        ],
        "accounts": [
            {
                "id": 7,
                "user_id": 1,
                "product_id": 1,
                "principal_balance": "0.00",
                "status": "ACTIVE",
                "opened_at": "2026-01-03T10:00:00Z"
            }
        ],
        "transactions": [
            {
                "id": 10,
                "user_id": 1,
                "account_id": 7,
                "amount": "200.00",
                "transaction_type": "OPEN_SAVINGS",
                "status": "PENDING",
                "created_at": "2026-01-04T10:00:00Z"
            }
        ]
    }"#;

    #[test]
    fn test_seed_round_trip() {
        let seed = Seed::from_reader(SEED.as_bytes()).unwrap();
        seed.validate().unwrap();

        let summary = seed.summary();
        assert_eq!(summary.users, 1);
        assert_eq!(summary.pending, 1);

        let state = seed.into_state();
        assert!(state.transactions.contains_key(&10));
        assert_eq!(state.accounts[&7].user_id, 1);
    }

    #[test]
    fn test_seed_rejects_dangling_account_reference() {
        let mut seed = Seed::from_reader(SEED.as_bytes()).unwrap();
        seed.accounts[0].user_id = 42;
        let result = seed.validate();
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_seed_rejects_malformed_json() {
        let result = Seed::from_reader("not json".as_bytes());
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }
}
