use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

impl Role {
    /// Whether this role may act on the approval queue.
    pub fn can_process_transactions(self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Locked,
}

/// A registered user. Customers hold the wallet balance that the approval
/// engine mutates; staff and admins act on the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub wallet_balance: Decimal,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Adds funds to the wallet.
    pub fn credit_wallet(&mut self, amount: Decimal) {
        self.wallet_balance += amount;
    }

    /// Removes funds from the wallet. The balance is never allowed to go
    /// negative; callers validate first, this guard is the invariant.
    pub fn debit_wallet(&mut self, amount: Decimal) -> Result<()> {
        if self.wallet_balance >= amount {
            self.wallet_balance -= amount;
            Ok(())
        } else {
            Err(LedgerError::InsufficientFunds {
                required: amount,
                available: self.wallet_balance,
            })
        }
    }
}
