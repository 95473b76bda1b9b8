use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::user::UserId;

pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    DepositToWallet,
    WithdrawFromWallet,
    OpenSavings,
    CloseSavings,
}

/// Lifecycle of a queued transaction. `Pending` is the only state with
/// outgoing transitions; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested money movement awaiting staff action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    /// Linked savings account for `OpenSavings`/`CloseSavings` requests.
    #[serde(default)]
    pub account_id: Option<AccountId>,
    pub amount: Decimal,
    #[serde(rename = "transaction_type")]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// The staff member who moved this transaction to a terminal state.
    #[serde(default)]
    pub processed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// A submission that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub account_id: Option<AccountId>,
    pub amount: Decimal,
    pub kind: TransactionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Approved.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_kind_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::WithdrawFromWallet).unwrap(),
            "\"WITHDRAW_FROM_WALLET\""
        );
        let kind: TransactionKind = serde_json::from_str("\"OPEN_SAVINGS\"").unwrap();
        assert_eq!(kind, TransactionKind::OpenSavings);
    }

    #[test]
    fn test_transaction_json_uses_transaction_type_key() {
        let json = r#"{
            "id": 5,
            "user_id": 1,
            "amount": "150.00",
            "transaction_type": "DEPOSIT_TO_WALLET",
            "status": "PENDING",
            "created_at": "2026-01-10T09:00:00Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::DepositToWallet);
        assert_eq!(tx.account_id, None);
        assert_eq!(tx.processed_by, None);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }
}
