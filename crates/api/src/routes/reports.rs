//! Financial report routes: direct report reads (cached) and the report
//! lifecycle (create, generate, cancel, poll).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::routes::{report_error_response, require};
use crate::{AppState, middleware::AuthUser};
use ledgerly_core::audit::{AuditAction, AuditEvent};
use ledgerly_core::authz::Operation;
use ledgerly_core::reports::{ReportService, ReportStatus, ReportType};
use ledgerly_db::ReportCache;
use ledgerly_db::entities::reports;
use ledgerly_db::repositories::{AuditLogRepository, CreateReportInput, ReportRepository};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/trial-balance", get(trial_balance))
        .route("/reports/balance-sheet", get(balance_sheet))
        .route("/reports/income-statement", get(income_statement))
        .route("/reports", get(list_reports))
        .route("/reports", post(create_report))
        .route("/reports/{id}", get(get_report))
        .route("/reports/{id}/generate", post(generate_report))
        .route("/reports/{id}/cancel", post(cancel_report))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for point-in-time reports.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// As-of date (YYYY-MM-DD); defaults to today.
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for period reports.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Period start (YYYY-MM-DD).
    pub start: NaiveDate,
    /// Period end (YYYY-MM-DD).
    pub end: NaiveDate,
}

/// Query parameters for the report listing.
#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    /// Filter by status.
    pub status: Option<String>,
}

/// Request body for creating a report lifecycle record.
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    /// Report display name.
    pub name: String,
    /// Report type code.
    pub report_type: String,
    /// Type-specific parameters (as_of / start_date / end_date /
    /// account_id).
    #[serde(default = "default_parameters")]
    pub parameters: serde_json::Value,
}

fn default_parameters() -> serde_json::Value {
    json!({})
}

fn report_json(report: &reports::Model) -> serde_json::Value {
    let status: ReportStatus = report.status.into();
    let report_type: ReportType = report.report_type.into();
    json!({
        "id": report.id,
        "report_number": report.report_number,
        "name": report.name,
        "report_type": report_type.as_str(),
        "parameters": report.parameters,
        "status": status.as_str(),
        "result": report.result,
        "error_message": report.error_message,
        "requested_by": report.requested_by,
        "started_at": report.started_at.map(|t| t.to_rfc3339()),
        "completed_at": report.completed_at.map(|t| t.to_rfc3339()),
        "created_at": report.created_at.to_rfc3339(),
    })
}

// ============================================================================
// Direct report reads (cached)
// ============================================================================

/// GET `/reports/trial-balance?as_of=` - Trial balance as of a date.
async fn trial_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ViewReports) {
        return response;
    }

    let as_of = query.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let cache_key = ReportCache::report_key("trial_balance", &as_of.to_string());

    if let Some(cached) = state.report_cache.get(&cache_key) {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    let repo = ReportRepository::new((*state.db).clone());

    let activities = match repo.activities_as_of(as_of).await {
        Ok(activities) => activities,
        Err(e) => return report_error_response(&e),
    };

    match ReportService::trial_balance(as_of, activities) {
        Ok(report) => match serde_json::to_value(&report) {
            Ok(payload) => {
                state.report_cache.set(cache_key, payload.clone());
                (StatusCode::OK, Json(payload)).into_response()
            }
            Err(e) => {
                warn!(error = %e, "Failed to serialize trial balance");
                (StatusCode::INTERNAL_SERVER_ERROR, ()).into_response()
            }
        },
        Err(e) => report_error_response(&e),
    }
}

/// GET `/reports/balance-sheet?as_of=` - Balance sheet as of a date.
async fn balance_sheet(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ViewReports) {
        return response;
    }

    let as_of = query.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let cache_key = ReportCache::report_key("balance_sheet", &as_of.to_string());

    if let Some(cached) = state.report_cache.get(&cache_key) {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    let repo = ReportRepository::new((*state.db).clone());

    let activities = match repo.activities_as_of(as_of).await {
        Ok(activities) => activities,
        Err(e) => return report_error_response(&e),
    };

    let report = ReportService::balance_sheet(as_of, activities);
    if !report.is_balanced {
        warn!(as_of = %as_of, "Balance sheet identity does not hold");
    }

    match serde_json::to_value(&report) {
        Ok(payload) => {
            state.report_cache.set(cache_key, payload.clone());
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Failed to serialize balance sheet");
            (StatusCode::INTERNAL_SERVER_ERROR, ()).into_response()
        }
    }
}

/// GET `/reports/income-statement?start=&end=` - Income statement over a
/// range.
async fn income_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ViewReports) {
        return response;
    }

    let cache_key = ReportCache::report_key(
        "income_statement",
        &format!("{}:{}", query.start, query.end),
    );

    if let Some(cached) = state.report_cache.get(&cache_key) {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    let repo = ReportRepository::new((*state.db).clone());

    let activities = match repo.activities_in_range(query.start, query.end).await {
        Ok(activities) => activities,
        Err(e) => return report_error_response(&e),
    };

    match ReportService::income_statement(query.start, query.end, activities) {
        Ok(report) => match serde_json::to_value(&report) {
            Ok(payload) => {
                state.report_cache.set(cache_key, payload.clone());
                (StatusCode::OK, Json(payload)).into_response()
            }
            Err(e) => {
                warn!(error = %e, "Failed to serialize income statement");
                (StatusCode::INTERNAL_SERVER_ERROR, ()).into_response()
            }
        },
        Err(e) => report_error_response(&e),
    }
}

// ============================================================================
// Report lifecycle
// ============================================================================

/// GET `/reports` - List report lifecycle records.
async fn list_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListReportsQuery>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ViewReports) {
        return response;
    }

    let status = query
        .status
        .as_deref()
        .and_then(ReportStatus::from_code)
        .map(Into::into);

    let repo = ReportRepository::new((*state.db).clone());

    match repo.list_reports(status).await {
        Ok(reports) => {
            let items: Vec<serde_json::Value> = reports.iter().map(report_json).collect();
            (StatusCode::OK, Json(json!({ "reports": items }))).into_response()
        }
        Err(e) => report_error_response(&e),
    }
}

/// POST `/reports` - Create a PENDING report lifecycle record.
async fn create_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateReportRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::GenerateReports) {
        return response;
    }

    let Some(report_type) = ReportType::from_code(&payload.report_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "unsupported_report_type",
                "message": format!("Unsupported report type: {}", payload.report_type)
            })),
        )
            .into_response();
    };

    let repo = ReportRepository::new((*state.db).clone());

    match repo
        .create_report(CreateReportInput {
            name: payload.name,
            report_type: report_type.into(),
            parameters: payload.parameters,
            requested_by: auth.user_id(),
        })
        .await
    {
        Ok(report) => {
            info!(report_id = %report.id, report_number = %report.report_number, "Report created");
            (StatusCode::CREATED, Json(report_json(&report))).into_response()
        }
        Err(e) => report_error_response(&e),
    }
}

/// GET `/reports/{id}` - Poll a report's status and result.
async fn get_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ViewReports) {
        return response;
    }

    let repo = ReportRepository::new((*state.db).clone());

    match repo.get_report(id).await {
        Ok(report) => (StatusCode::OK, Json(report_json(&report))).into_response(),
        Err(e) => report_error_response(&e),
    }
}

/// POST `/reports/{id}/generate` - Run generation for a report.
///
/// Allowed from PENDING or FAILED (retry). Any aggregation failure is
/// persisted as FAILED; a report is never left stuck in GENERATING.
async fn generate_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::GenerateReports) {
        return response;
    }

    let repo = ReportRepository::new((*state.db).clone());

    match repo.generate(id).await {
        Ok(report) => {
            info!(report_id = %id, "Report generated");
            record_report_audit(&state, auth.user_id(), AuditAction::Generate, id).await;
            (StatusCode::OK, Json(report_json(&report))).into_response()
        }
        Err(e) => report_error_response(&e),
    }
}

/// POST `/reports/{id}/cancel` - Cancel a pending or generating report.
async fn cancel_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::GenerateReports) {
        return response;
    }

    let repo = ReportRepository::new((*state.db).clone());

    match repo.cancel(id).await {
        Ok(report) => {
            info!(report_id = %id, "Report cancelled");
            record_report_audit(&state, auth.user_id(), AuditAction::Cancel, id).await;
            (StatusCode::OK, Json(report_json(&report))).into_response()
        }
        Err(e) => report_error_response(&e),
    }
}

/// Records a report audit event; failures are warnings only.
async fn record_report_audit(state: &AppState, actor: Uuid, action: AuditAction, id: Uuid) {
    let audit = AuditLogRepository::new((*state.db).clone());
    let event = AuditEvent::new(actor, action, "report", id);
    if let Err(e) = audit.record(&event).await {
        warn!(error = %e, action = action.as_str(), "Failed to record audit event");
    }
}
