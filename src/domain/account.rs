use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::UserId;

pub type AccountId = u64;
pub type ProductId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Closed,
}

/// A savings account holding principal separate from the owner's wallet.
///
/// Accounts are provisioned by an external creation step (possibly before
/// the funding transaction is approved); the approval engine only ever
/// transitions them to `Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsAccount {
    pub id: AccountId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub principal_balance: Decimal,
    pub status: AccountStatus,
    pub opened_at: DateTime<Utc>,
}

impl SavingsAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Reference data describing a savings offer. Never mutated during
/// transaction processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsProduct {
    pub id: ProductId,
    pub name: String,
    pub term_months: u32,
    pub interest_rate: Decimal,
    pub min_days_hold: u32,
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
}
