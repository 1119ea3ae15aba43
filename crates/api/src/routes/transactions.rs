//! Transaction routes: CRUD for pending transactions plus the post and
//! void operations.

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
use tracing::{info, warn};
use uuid::Uuid;

use crate::routes::{ledger_error_response, require};
use crate::{AppState, middleware::AuthUser};
use ledgerly_core::audit::{AuditAction, AuditEvent};
use ledgerly_core::authz::Operation;
use ledgerly_core::ledger::TransactionStatus;
use ledgerly_db::cache::{BALANCE_PREFIX, REPORT_PREFIX};
use ledgerly_db::entities::{journal_entries, journal_items, transactions};
use ledgerly_db::repositories::{
    AuditLogRepository, CreateJournalEntryInput, CreateJournalItemInput, CreateTransactionInput,
    PostingRepository, TransactionFilter, TransactionRepository, TransactionWithEntries,
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transaction-types", get(list_transaction_types))
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}", patch(update_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
        .route("/transactions/{id}/post", post(post_transaction))
        .route("/transactions/{id}/void", post(void_transaction))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by status: "pending", "posted", or "void".
    pub status: Option<String>,
    /// Filter by transaction type ID.
    #[serde(rename = "type")]
    pub transaction_type_id: Option<Uuid>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Request body for a single journal item.
#[derive(Debug, Deserialize)]
pub struct JournalItemRequest {
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount (zero if credit).
    #[serde(default)]
    pub debit_amount: Decimal,
    /// Credit amount (zero if debit).
    #[serde(default)]
    pub credit_amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

/// Request body for a single journal entry.
#[derive(Debug, Deserialize)]
pub struct JournalEntryRequest {
    /// Entry description.
    pub description: String,
    /// Ordering within the transaction.
    #[serde(default)]
    pub sort_order: i32,
    /// The entry's items.
    pub items: Vec<JournalItemRequest>,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Explicit transaction number; generated when absent.
    pub transaction_number: Option<String>,
    /// Optional external reference number.
    pub reference_number: Option<String>,
    /// Transaction description.
    pub description: String,
    /// Transaction date (YYYY-MM-DD).
    pub transaction_date: NaiveDate,
    /// Transaction type ID.
    pub transaction_type_id: Uuid,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Journal entries.
    pub entries: Vec<JournalEntryRequest>,
}

/// Request body for updating a pending transaction.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    /// Description.
    pub description: Option<String>,
    /// Reference number.
    pub reference_number: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

/// Response for a journal item.
#[derive(Debug, Serialize)]
pub struct JournalItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit_amount: String,
    /// Credit amount.
    pub credit_amount: String,
    /// Line description.
    pub description: Option<String>,
}

/// Response for a journal entry.
#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Entry description.
    pub description: String,
    /// Entry amount.
    pub amount: String,
    /// Ordering within the transaction.
    pub sort_order: i32,
    /// The entry's items.
    pub items: Vec<JournalItemResponse>,
}

/// Response for a transaction with entries.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Transaction number.
    pub transaction_number: String,
    /// Reference number.
    pub reference_number: Option<String>,
    /// Description.
    pub description: String,
    /// Transaction date.
    pub transaction_date: String,
    /// Transaction type ID.
    pub transaction_type_id: Uuid,
    /// Header amount.
    pub amount: String,
    /// Status.
    pub status: String,
    /// Whether the transaction is posted.
    pub is_posted: bool,
    /// When the transaction was posted.
    pub posted_at: Option<String>,
    /// When the transaction was voided.
    pub voided_at: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
    /// Journal entries.
    pub entries: Vec<JournalEntryResponse>,
}

fn status_string(status: ledgerly_db::entities::sea_orm_active_enums::TransactionStatus) -> String {
    let status: TransactionStatus = status.into();
    status.as_str().to_string()
}

fn transaction_response(result: TransactionWithEntries) -> TransactionResponse {
    let TransactionWithEntries {
        transaction,
        entries,
    } = result;

    TransactionResponse {
        id: transaction.id,
        transaction_number: transaction.transaction_number,
        reference_number: transaction.reference_number,
        description: transaction.description,
        transaction_date: transaction.transaction_date.to_string(),
        transaction_type_id: transaction.transaction_type_id,
        amount: transaction.amount.to_string(),
        status: status_string(transaction.status),
        is_posted: transaction.status
            == ledgerly_db::entities::sea_orm_active_enums::TransactionStatus::Posted,
        posted_at: transaction.posted_at.map(|t| t.to_rfc3339()),
        voided_at: transaction.voided_at.map(|t| t.to_rfc3339()),
        created_at: transaction.created_at.to_rfc3339(),
        updated_at: transaction.updated_at.to_rfc3339(),
        entries: entries.into_iter().map(entry_response).collect(),
    }
}

fn entry_response(
    (entry, items): (journal_entries::Model, Vec<journal_items::Model>),
) -> JournalEntryResponse {
    JournalEntryResponse {
        id: entry.id,
        description: entry.description,
        amount: entry.amount.to_string(),
        sort_order: entry.sort_order,
        items: items
            .into_iter()
            .map(|item| JournalItemResponse {
                id: item.id,
                account_id: item.account_id,
                debit_amount: item.debit_amount.to_string(),
                credit_amount: item.credit_amount.to_string(),
                description: item.description,
            })
            .collect(),
    }
}

fn header_json(transaction: &transactions::Model) -> serde_json::Value {
    json!({
        "id": transaction.id,
        "transaction_number": transaction.transaction_number,
        "status": status_string(transaction.status),
        "posted_at": transaction.posted_at.map(|t| t.to_rfc3339()),
        "voided_at": transaction.voided_at.map(|t| t.to_rfc3339()),
        "updated_at": transaction.updated_at.to_rfc3339(),
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transaction-types` - List active transaction types.
async fn list_transaction_types(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.list_transaction_types().await {
        Ok(types) => {
            (StatusCode::OK, Json(json!({ "transaction_types": types }))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/transactions` - List transactions with filters.
async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let status = query
        .status
        .as_deref()
        .and_then(TransactionStatus::from_code)
        .map(Into::into);

    let filter = TransactionFilter {
        status,
        transaction_type_id: query.transaction_type_id,
        date_from: query.from,
        date_to: query.to,
    };

    match repo.list_transactions(filter).await {
        Ok(transactions) => {
            let items: Vec<serde_json::Value> = transactions
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "transaction_number": t.transaction_number,
                        "reference_number": t.reference_number,
                        "description": t.description,
                        "transaction_date": t.transaction_date.to_string(),
                        "amount": t.amount.to_string(),
                        "status": status_string(t.status),
                        "created_at": t.created_at.to_rfc3339(),
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "transactions": items }))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/transactions` - Create a PENDING transaction.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::CreateTransaction) {
        return response;
    }

    if payload.entries.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "no_entries",
                "message": "Transaction must have at least one journal entry"
            })),
        )
            .into_response();
    }

    let repo = TransactionRepository::new((*state.db).clone());

    let input = CreateTransactionInput {
        transaction_number: payload.transaction_number,
        reference_number: payload.reference_number,
        description: payload.description,
        transaction_date: payload.transaction_date,
        transaction_type_id: payload.transaction_type_id,
        notes: payload.notes,
        entries: payload
            .entries
            .into_iter()
            .map(|entry| CreateJournalEntryInput {
                description: entry.description,
                sort_order: entry.sort_order,
                items: entry
                    .items
                    .into_iter()
                    .map(|item| CreateJournalItemInput {
                        account_id: item.account_id,
                        debit_amount: item.debit_amount,
                        credit_amount: item.credit_amount,
                        description: item.description,
                    })
                    .collect(),
            })
            .collect(),
    };

    match repo.create_transaction(input).await {
        Ok(result) => {
            info!(
                transaction_id = %result.transaction.id,
                transaction_number = %result.transaction.transaction_number,
                "Transaction created"
            );
            record_audit(
                &state,
                AuditEvent::new(
                    auth.user_id(),
                    AuditAction::Create,
                    "transaction",
                    result.transaction.id,
                )
                .with_details(json!({
                    "transaction_number": result.transaction.transaction_number
                })),
            )
            .await;

            (StatusCode::CREATED, Json(transaction_response(result))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/transactions/{id}` - Get a transaction with entries and items.
async fn get_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.get_transaction(id).await {
        Ok(result) => (StatusCode::OK, Json(transaction_response(result))).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// PATCH `/transactions/{id}` - Update a PENDING transaction's header.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::CreateTransaction) {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());

    match repo
        .update_transaction(
            id,
            payload.description,
            payload.reference_number,
            payload.notes,
        )
        .await
    {
        Ok(transaction) => {
            info!(transaction_id = %id, "Transaction updated");
            (StatusCode::OK, Json(header_json(&transaction))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// DELETE `/transactions/{id}` - Delete a PENDING transaction.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::CreateTransaction) {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());

    match repo.delete_transaction(id).await {
        Ok(()) => {
            info!(transaction_id = %id, "Transaction deleted");
            record_audit(
                &state,
                AuditEvent::new(auth.user_id(), AuditAction::Delete, "transaction", id),
            )
            .await;
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/transactions/{id}/post` - Validate and post a transaction.
///
/// The balance mutation is atomic inside the posting repository; the
/// audit record and cache invalidation below are explicit post-commit
/// side effects so the control flow of a financial mutation is fully
/// auditable from this function body.
async fn post_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::PostTransaction) {
        return response;
    }

    let posting = PostingRepository::new((*state.db).clone());

    match posting.post_transaction(id, auth.user_id()).await {
        Ok(transaction) => {
            info!(
                transaction_id = %id,
                transaction_number = %transaction.transaction_number,
                "Transaction posted"
            );

            record_audit(
                &state,
                AuditEvent::new(auth.user_id(), AuditAction::Post, "transaction", id)
                    .with_details(json!({
                        "transaction_number": transaction.transaction_number
                    })),
            )
            .await;
            invalidate_ledger_caches(&state);

            (StatusCode::OK, Json(header_json(&transaction))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/transactions/{id}/void` - Void a posted transaction.
async fn void_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::VoidTransaction) {
        return response;
    }

    let posting = PostingRepository::new((*state.db).clone());

    match posting.void_transaction(id, auth.user_id()).await {
        Ok(transaction) => {
            info!(
                transaction_id = %id,
                transaction_number = %transaction.transaction_number,
                "Transaction voided"
            );

            record_audit(
                &state,
                AuditEvent::new(auth.user_id(), AuditAction::Void, "transaction", id)
                    .with_details(json!({
                        "transaction_number": transaction.transaction_number
                    })),
            )
            .await;
            invalidate_ledger_caches(&state);

            (StatusCode::OK, Json(header_json(&transaction))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

// ============================================================================
// Side-effect helpers
// ============================================================================

/// Records an audit event; failure is a degraded-mode warning, never an
/// error for the business operation.
async fn record_audit(state: &AppState, event: AuditEvent) {
    let audit = AuditLogRepository::new((*state.db).clone());
    if let Err(e) = audit.record(&event).await {
        warn!(error = %e, action = event.action.as_str(), "Failed to record audit event");
    }
}

/// Drops cached report and balance reads after a ledger mutation. The
/// cache is best-effort; the ledger mutation has already committed.
fn invalidate_ledger_caches(state: &AppState) {
    state.report_cache.invalidate_prefix(REPORT_PREFIX);
    state.report_cache.invalidate_prefix(BALANCE_PREFIX);
}
