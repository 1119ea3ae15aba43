//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::routes::{coa_error_response, report_error_response, require};
use crate::{AppState, middleware::AuthUser};
use ledgerly_core::authz::Operation;
use ledgerly_core::ledger::BalanceType;
use ledgerly_db::repositories::{
    AccountFilter, AccountRepository, CreateAccountInput, CreateCategoryInput, ReportRepository,
    UpdateAccountInput, UpdateCategoryInput,
};
use ledgerly_db::repositories::account::CategoryTree;
use ledgerly_db::entities::accounts;

/// Creates the chart of accounts routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account-types", get(list_account_types))
        .route("/account-categories", get(list_categories))
        .route("/account-categories", post(create_category))
        .route("/account-categories/{id}", patch(update_category))
        .route("/account-categories/{id}/tree", get(category_tree))
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}", patch(update_account))
        .route("/accounts/{id}", delete(deactivate_account))
        .route("/accounts/{id}/ledger", get(account_ledger))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by account type ID.
    #[serde(rename = "type")]
    pub account_type_id: Option<Uuid>,
    /// Filter by category ID.
    pub category: Option<Uuid>,
    /// Filter by active status.
    pub active: Option<bool>,
    /// Filter by bank-account flag.
    pub bank: Option<bool>,
    /// Filter by cash-account flag.
    pub cash: Option<bool>,
    /// Filter by reconcilable flag.
    pub reconcilable: Option<bool>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account number (unique).
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type ID.
    pub account_type_id: Uuid,
    /// Category ID.
    pub category_id: Uuid,
    /// Balance type: "debit" or "credit".
    pub balance_type: String,
    /// Opening balance.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Whether this is a bank account.
    #[serde(default)]
    pub is_bank_account: bool,
    /// Whether this is a cash account.
    #[serde(default)]
    pub is_cash_account: bool,
    /// Whether this account is reconcilable.
    #[serde(default)]
    pub is_reconcilable: bool,
    /// Whether direct posting is allowed.
    #[serde(default = "default_allow_posting")]
    pub allow_posting: bool,
    /// Ordering within listings.
    #[serde(default)]
    pub sort_order: i32,
}

fn default_allow_posting() -> bool {
    true
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// Account name.
    pub name: Option<String>,
    /// Account description.
    pub description: Option<Option<String>>,
    /// Category ID.
    pub category_id: Option<Uuid>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
    /// Whether this is a bank account.
    pub is_bank_account: Option<bool>,
    /// Whether this is a cash account.
    pub is_cash_account: Option<bool>,
    /// Whether this account is reconcilable.
    pub is_reconcilable: Option<bool>,
    /// Whether direct posting is allowed.
    pub allow_posting: Option<bool>,
    /// Ordering within listings.
    pub sort_order: Option<i32>,
}

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Category code.
    pub code: String,
    /// Category name.
    pub name: String,
    /// Category description.
    pub description: Option<String>,
    /// Account type ID.
    pub account_type_id: Uuid,
    /// Optional parent category.
    pub parent_category_id: Option<Uuid>,
    /// Ordering among siblings.
    #[serde(default)]
    pub sort_order: i32,
}

/// Request body for updating a category.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    /// Category name.
    pub name: Option<String>,
    /// Category description.
    pub description: Option<Option<String>>,
    /// New parent (null detaches to root).
    pub parent_category_id: Option<Option<Uuid>>,
    /// Ordering among siblings.
    pub sort_order: Option<i32>,
    /// Whether the category is active.
    pub is_active: Option<bool>,
}

/// Query parameters for the category listing.
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// Filter by account type ID.
    #[serde(rename = "type")]
    pub account_type_id: Option<Uuid>,
}

/// Query parameters for the account ledger.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Period start (YYYY-MM-DD).
    pub start: NaiveDate,
    /// Period end (YYYY-MM-DD).
    pub end: NaiveDate,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type ID.
    pub account_type_id: Uuid,
    /// Category ID.
    pub category_id: Uuid,
    /// Balance type.
    pub balance_type: String,
    /// Opening balance.
    pub opening_balance: String,
    /// Current balance.
    pub current_balance: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether this is a bank account.
    pub is_bank_account: bool,
    /// Whether this is a cash account.
    pub is_cash_account: bool,
    /// Whether this account is reconcilable.
    pub is_reconcilable: bool,
    /// Whether direct posting is allowed.
    pub allow_posting: bool,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        let balance_type: BalanceType = model.balance_type.into();
        Self {
            id: model.id,
            account_number: model.account_number,
            name: model.name,
            description: model.description,
            account_type_id: model.account_type_id,
            category_id: model.category_id,
            balance_type: balance_type.as_str().to_string(),
            opening_balance: model.opening_balance.to_string(),
            current_balance: model.current_balance.to_string(),
            is_active: model.is_active,
            is_bank_account: model.is_bank_account,
            is_cash_account: model.is_cash_account,
            is_reconcilable: model.is_reconcilable,
            allow_posting: model.allow_posting,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/account-types` - List account types.
async fn list_account_types(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.list_account_types().await {
        Ok(types) => {
            let items: Vec<serde_json::Value> = types
                .into_iter()
                .map(|t| {
                    let normal: BalanceType = t.normal_balance.into();
                    json!({
                        "id": t.id,
                        "code": t.code,
                        "name": t.name,
                        "normal_balance": normal.as_str(),
                        "is_active": t.is_active,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "account_types": items }))).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// GET `/account-categories` - List categories, optionally by type.
async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListCategoriesQuery>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.list_categories(query.account_type_id).await {
        Ok(categories) => {
            (StatusCode::OK, Json(json!({ "categories": categories }))).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// POST `/account-categories` - Create a category.
async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ManageAccounts) {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo
        .create_category(CreateCategoryInput {
            code: payload.code,
            name: payload.name,
            description: payload.description,
            account_type_id: payload.account_type_id,
            parent_category_id: payload.parent_category_id,
            sort_order: payload.sort_order,
        })
        .await
    {
        Ok(category) => {
            info!(category_id = %category.id, "Account category created");
            (StatusCode::CREATED, Json(category)).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// PATCH `/account-categories/{id}` - Update a category.
async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ManageAccounts) {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo
        .update_category(
            id,
            UpdateCategoryInput {
                name: payload.name,
                description: payload.description,
                parent_category_id: payload.parent_category_id,
                sort_order: payload.sort_order,
                is_active: payload.is_active,
            },
        )
        .await
    {
        Ok(category) => {
            info!(category_id = %id, "Account category updated");
            (StatusCode::OK, Json(category)).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// GET `/account-categories/{id}/tree` - Hierarchical traversal:
/// category -> subcategories -> accounts.
async fn category_tree(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.category_tree(id).await {
        Ok(tree) => (StatusCode::OK, Json(tree_to_json(&tree))).into_response(),
        Err(e) => coa_error_response(&e),
    }
}

fn tree_to_json(tree: &CategoryTree) -> serde_json::Value {
    json!({
        "category": tree.category,
        "subcategories": tree.subcategories.iter().map(tree_to_json).collect::<Vec<_>>(),
        "accounts": tree.accounts.iter().cloned().map(AccountResponse::from).collect::<Vec<_>>(),
    })
}

/// GET `/accounts` - List accounts with filters.
async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    let filter = AccountFilter {
        account_type_id: query.account_type_id,
        category_id: query.category,
        is_active: query.active,
        is_bank_account: query.bank,
        is_cash_account: query.cash,
        is_reconcilable: query.reconcilable,
    };

    match repo.list_accounts(filter).await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> =
                accounts.into_iter().map(AccountResponse::from).collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ManageAccounts) {
        return response;
    }

    let Some(balance_type) = BalanceType::from_code(&payload.balance_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_balance_type",
                "message": "Balance type must be 'debit' or 'credit'"
            })),
        )
            .into_response();
    };

    let repo = AccountRepository::new((*state.db).clone());

    match repo
        .create_account(CreateAccountInput {
            account_number: payload.account_number,
            name: payload.name,
            description: payload.description,
            account_type_id: payload.account_type_id,
            category_id: payload.category_id,
            balance_type,
            opening_balance: payload.opening_balance,
            is_bank_account: payload.is_bank_account,
            is_cash_account: payload.is_cash_account,
            is_reconcilable: payload.is_reconcilable,
            allow_posting: payload.allow_posting,
            sort_order: payload.sort_order,
        })
        .await
    {
        Ok(account) => {
            info!(account_id = %account.id, account_number = %account.account_number, "Account created");
            (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// GET `/accounts/{id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.find_account(id).await {
        Ok(account) => (StatusCode::OK, Json(AccountResponse::from(account))).into_response(),
        Err(e) => coa_error_response(&e),
    }
}

/// PATCH `/accounts/{id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ManageAccounts) {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo
        .update_account(
            id,
            UpdateAccountInput {
                name: payload.name,
                description: payload.description,
                category_id: payload.category_id,
                is_active: payload.is_active,
                is_bank_account: payload.is_bank_account,
                is_cash_account: payload.is_cash_account,
                is_reconcilable: payload.is_reconcilable,
                allow_posting: payload.allow_posting,
                sort_order: payload.sort_order,
            },
        )
        .await
    {
        Ok(account) => {
            info!(account_id = %id, "Account updated");
            (StatusCode::OK, Json(AccountResponse::from(account))).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// DELETE `/accounts/{id}` - Deactivate an account.
///
/// Accounts with posted activity cannot be deactivated.
async fn deactivate_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ManageAccounts) {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo.deactivate_account(id).await {
        Ok(()) => {
            info!(account_id = %id, "Account deactivated");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => coa_error_response(&e),
    }
}

/// GET `/accounts/{id}/ledger` - General ledger for one account.
async fn account_ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<LedgerQuery>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ViewReports) {
        return response;
    }

    let repo = ReportRepository::new((*state.db).clone());

    match repo.general_ledger(id, query.start, query.end).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => report_error_response(&e),
    }
}
