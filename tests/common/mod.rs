#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use teller::domain::account::{AccountId, AccountStatus, SavingsAccount, SavingsProduct};
use teller::domain::transaction::{
    Transaction, TransactionId, TransactionKind, TransactionStatus,
};
use teller::domain::user::{Role, User, UserId, UserStatus};
use teller::infrastructure::in_memory::LedgerState;

pub const ALICE: UserId = 1; // customer
pub const BOB: UserId = 2; // customer
pub const CAROL: UserId = 3; // staff
pub const DAVE: UserId = 4; // admin

fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, n, 9, 0, 0).unwrap()
}

pub fn user(id: UserId, name: &str, role: Role, wallet: Decimal) -> User {
    User {
        id,
        email: format!("{}@example.com", name.to_lowercase()),
        full_name: name.to_string(),
        role,
        wallet_balance: wallet,
        status: UserStatus::Active,
        created_at: day(id as u32),
    }
}

pub fn product(id: u64, name: &str) -> SavingsProduct {
    SavingsProduct {
        id,
        name: name.to_string(),
        term_months: 6,
        interest_rate: dec!(4.5),
        min_days_hold: 30,
        is_active: true,
        description: String::new(),
    }
}

pub fn account(
    id: AccountId,
    user_id: UserId,
    principal: Decimal,
    status: AccountStatus,
) -> SavingsAccount {
    SavingsAccount {
        id,
        user_id,
        product_id: 1,
        principal_balance: principal,
        status,
        opened_at: day(10),
    }
}

pub fn pending_tx(
    id: TransactionId,
    user_id: UserId,
    kind: TransactionKind,
    amount: Decimal,
    account_id: Option<AccountId>,
) -> Transaction {
    Transaction {
        id,
        user_id,
        account_id,
        amount,
        kind,
        status: TransactionStatus::Pending,
        processed_by: None,
        created_at: day(15),
    }
}

/// A small, deterministic world: two customers, one staff member, one
/// admin, a product, and a savings account per customer.
pub fn demo_state() -> LedgerState {
    let mut state = LedgerState::default();
    state
        .users
        .insert(ALICE, user(ALICE, "Alice", Role::Customer, dec!(100.00)));
    state
        .users
        .insert(BOB, user(BOB, "Bob", Role::Customer, dec!(500.00)));
    state
        .users
        .insert(CAROL, user(CAROL, "Carol", Role::Staff, dec!(0.00)));
    state
        .users
        .insert(DAVE, user(DAVE, "Dave", Role::Admin, dec!(0.00)));
    state.products.insert(1, product(1, "6-month fixed"));
    state
        .accounts
        .insert(7, account(7, ALICE, dec!(0.00), AccountStatus::Active));
    state
        .accounts
        .insert(9, account(9, BOB, dec!(1000.00), AccountStatus::Active));
    state
}
