use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ports::Ledger;
use crate::domain::transaction::TransactionStatus;
use crate::domain::user::{Role, UserStatus};
use crate::error::Result;

/// System-wide money position: spendable customer cash vs. locked-up
/// savings principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemBalance {
    pub total_wallet_balance: Decimal,
    pub total_savings_principal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_customers: usize,
    pub total_staff: usize,
    pub total_admins: usize,
    pub active_savings_accounts: usize,
    pub total_savings_amount: Decimal,
    pub pending_transactions: usize,
    pub active_products: usize,
    pub locked_accounts: usize,
}

pub async fn system_balance(ledger: &dyn Ledger) -> Result<SystemBalance> {
    let users = ledger.users().await?;
    let accounts = ledger.savings_accounts().await?;

    Ok(SystemBalance {
        total_wallet_balance: users
            .iter()
            .filter(|u| u.role == Role::Customer)
            .map(|u| u.wallet_balance)
            .sum(),
        total_savings_principal: accounts
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.principal_balance)
            .sum(),
    })
}

pub async fn dashboard(ledger: &dyn Ledger) -> Result<DashboardStats> {
    let users = ledger.users().await?;
    let accounts = ledger.savings_accounts().await?;
    let products = ledger.products().await?;
    let transactions = ledger.transactions().await?;

    let role_count = |role: Role| users.iter().filter(|u| u.role == role).count();
    let active_accounts: Vec<_> = accounts.iter().filter(|a| a.is_active()).collect();

    Ok(DashboardStats {
        total_customers: role_count(Role::Customer),
        total_staff: role_count(Role::Staff),
        total_admins: role_count(Role::Admin),
        active_savings_accounts: active_accounts.len(),
        total_savings_amount: active_accounts.iter().map(|a| a.principal_balance).sum(),
        pending_transactions: transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending)
            .count(),
        active_products: products.iter().filter(|p| p.is_active).count(),
        locked_accounts: users
            .iter()
            .filter(|u| u.status == UserStatus::Locked)
            .count(),
    })
}
