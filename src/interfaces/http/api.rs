//! HTTP boundary for the approval backend.
//!
//! Builds the axum router. Every `/api` route goes through the capability
//! middleware in [`super::auth`]; handlers receive the resolved
//! [`AuthContext`] as an extension and pass the acting identity explicitly
//! into the core. Engine errors are typed all the way here and only mapped
//! to transport codes in this module.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router, middleware};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::engine::ApprovalEngine;
use crate::application::queue::RequestQueue;
use crate::application::reporting::{self, DashboardStats, SystemBalance};
use crate::domain::account::AccountId;
use crate::domain::ports::LedgerRef;
use crate::domain::transaction::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStatus,
};
use crate::domain::user::{Role, UserId, UserStatus};
use crate::error::LedgerError;
use crate::interfaces::http::auth::{self, AuthContext, AuthError, Authorizer};

/// Shared application state. Cheap to clone; everything sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ApprovalEngine>,
    pub queue: Arc<RequestQueue>,
    pub ledger: LedgerRef,
    pub authorizer: Arc<dyn Authorizer>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    let api = Router::new()
        .route("/transactions", get(list_transactions).post(submit_transaction))
        .route("/transactions/:id/approve", put(approve_transaction))
        .route("/transactions/:id/reject", put(reject_transaction))
        .route("/balance-system", get(system_balance))
        .route("/savings-accounts", get(list_savings_accounts))
        .route("/savings-accounts/:id", get(savings_account_detail))
        .route("/users", get(list_customers))
        .route("/admin/dashboard", get(admin_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Boundary-level failure: either the caller is not allowed in, or the core
/// refused the operation.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Ledger(LedgerError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            ApiError::Ledger(e) => {
                let status = match &e {
                    LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
                    LedgerError::InvalidState { .. }
                    | LedgerError::InsufficientFunds { .. }
                    | LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
                    LedgerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %e, "ledger failure");
                }
                (status, Json(ApiMessage::failure(e.to_string()))).into_response()
            }
        }
    }
}

/// The `{ success, message }` envelope used by action endpoints and every
/// failure response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_id: TransactionId,
    pub customer_name: String,
    pub amount: Decimal,
    pub transaction_type: TransactionKind,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub message: String,
    pub total: usize,
    pub transactions: Vec<TransactionRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub transaction_type: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub transaction: Transaction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavingsAccountRow {
    pub account_id: AccountId,
    pub customer_name: String,
    pub product_name: String,
    pub principal_balance: Decimal,
    pub opened_at: DateTime<Utc>,
    pub status: crate::domain::account::AccountStatus,
    pub interest_rate: Decimal,
    pub term_months: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavingsAccountListResponse {
    pub message: String,
    pub total: usize,
    pub accounts: Vec<SavingsAccountRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavingsAccountDetail {
    #[serde(flatten)]
    pub row: SavingsAccountRow,
    pub min_days_hold: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavingsAccountDetailResponse {
    pub message: String,
    pub account: SavingsAccountDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerRow {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub wallet_balance: Decimal,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub message: String,
    pub total: usize,
    pub users: Vec<CustomerRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemBalanceResponse {
    pub message: String,
    #[serde(flatten)]
    pub balance: SystemBalance,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub message: String,
    pub data: DashboardStats,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn approve_transaction(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<TransactionId>,
) -> Result<Json<ApiMessage>, ApiError> {
    ctx.require_staff()?;
    state.engine.approve(id, ctx.user_id).await?;
    Ok(Json(ApiMessage::success("transaction approved")))
}

async fn reject_transaction(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<TransactionId>,
) -> Result<Json<ApiMessage>, ApiError> {
    ctx.require_staff()?;
    state.engine.reject(id, ctx.user_id).await?;
    Ok(Json(ApiMessage::success("transaction rejected")))
}

async fn submit_transaction(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    ctx.require(&[Role::Customer])?;
    let transaction = state
        .queue
        .submit(NewTransaction {
            user_id: ctx.user_id,
            account_id: body.account_id,
            amount: body.amount,
            kind: body.transaction_type,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "transaction request submitted".into(),
            transaction,
        }),
    ))
}

async fn list_transactions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    ctx.require_staff()?;

    let names: HashMap<UserId, String> = state
        .ledger
        .users()
        .await?
        .into_iter()
        .map(|u| (u.id, u.full_name))
        .collect();

    let mut transactions = state.ledger.transactions().await?;
    if let Some(status) = filter.status {
        transactions.retain(|t| t.status == status);
    }
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let rows: Vec<TransactionRow> = transactions
        .into_iter()
        .map(|t| TransactionRow {
            transaction_id: t.id,
            customer_name: names.get(&t.user_id).cloned().unwrap_or_default(),
            amount: t.amount,
            transaction_type: t.kind,
            status: t.status,
            created_at: t.created_at,
        })
        .collect();

    Ok(Json(TransactionListResponse {
        message: "transaction history".into(),
        total: rows.len(),
        transactions: rows,
    }))
}

async fn system_balance(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<SystemBalanceResponse>, ApiError> {
    ctx.require_staff()?;
    let balance = reporting::system_balance(state.ledger.as_ref()).await?;
    Ok(Json(SystemBalanceResponse {
        message: "system balance".into(),
        balance,
    }))
}

async fn list_savings_accounts(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<SavingsAccountListResponse>, ApiError> {
    ctx.require_staff()?;

    let names: HashMap<UserId, String> = state
        .ledger
        .users()
        .await?
        .into_iter()
        .map(|u| (u.id, u.full_name))
        .collect();
    let products: HashMap<_, _> = state
        .ledger
        .products()
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut accounts = state.ledger.savings_accounts().await?;
    accounts.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));

    let rows: Vec<SavingsAccountRow> = accounts
        .into_iter()
        .map(|a| {
            let product = products.get(&a.product_id);
            SavingsAccountRow {
                account_id: a.id,
                customer_name: names.get(&a.user_id).cloned().unwrap_or_default(),
                product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
                principal_balance: a.principal_balance,
                opened_at: a.opened_at,
                status: a.status,
                interest_rate: product.map(|p| p.interest_rate).unwrap_or_default(),
                term_months: product.map(|p| p.term_months).unwrap_or_default(),
            }
        })
        .collect();

    Ok(Json(SavingsAccountListResponse {
        message: "savings accounts".into(),
        total: rows.len(),
        accounts: rows,
    }))
}

async fn savings_account_detail(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<AccountId>,
) -> Result<Json<SavingsAccountDetailResponse>, ApiError> {
    ctx.require_staff()?;

    let account = state
        .ledger
        .savings_accounts()
        .await?
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| LedgerError::not_found("savings account", id))?;
    let product = state
        .ledger
        .products()
        .await?
        .into_iter()
        .find(|p| p.id == account.product_id)
        .ok_or_else(|| LedgerError::not_found("product", account.product_id))?;
    let customer_name = state
        .ledger
        .users()
        .await?
        .into_iter()
        .find(|u| u.id == account.user_id)
        .map(|u| u.full_name)
        .unwrap_or_default();

    Ok(Json(SavingsAccountDetailResponse {
        message: "savings account detail".into(),
        account: SavingsAccountDetail {
            row: SavingsAccountRow {
                account_id: account.id,
                customer_name,
                product_name: product.name,
                principal_balance: account.principal_balance,
                opened_at: account.opened_at,
                status: account.status,
                interest_rate: product.interest_rate,
                term_months: product.term_months,
            },
            min_days_hold: product.min_days_hold,
        },
    }))
}

async fn list_customers(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<CustomerListResponse>, ApiError> {
    ctx.require_staff()?;

    let mut customers: Vec<_> = state
        .ledger
        .users()
        .await?
        .into_iter()
        .filter(|u| u.role == Role::Customer)
        .collect();
    customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let rows: Vec<CustomerRow> = customers
        .into_iter()
        .map(|u| CustomerRow {
            user_id: u.id,
            full_name: u.full_name,
            email: u.email,
            wallet_balance: u.wallet_balance,
            status: u.status,
            created_at: u.created_at,
        })
        .collect();

    Ok(Json(CustomerListResponse {
        message: "customers".into(),
        total: rows.len(),
        users: rows,
    }))
}

async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    ctx.require(&[Role::Admin])?;
    let data = reporting::dashboard(state.ledger.as_ref()).await?;
    Ok(Json(DashboardResponse {
        message: "dashboard statistics".into(),
        data,
    }))
}
