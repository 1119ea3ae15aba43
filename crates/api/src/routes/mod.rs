//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::middleware::{AuthUser, auth::auth_middleware};
use crate::AppState;
use ledgerly_core::authz::{Operation, authorize};
use ledgerly_core::coa::CoaError;
use ledgerly_core::ledger::LedgerError;
use ledgerly_core::reports::ReportError;

pub mod accounts;
pub mod cache;
pub mod health;
pub mod reports;
pub mod transactions;

/// Creates the API router with protected routes that need state for
/// middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(reports::routes())
        .merge(cache::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Checks that the authenticated user may perform an operation.
///
/// A deny short-circuits with 403 and no side effects.
///
/// # Errors
///
/// Returns the ready-to-send 403 response on deny or unknown role.
pub(crate) fn require(auth: &AuthUser, operation: Operation) -> Result<(), Response> {
    let allowed = auth
        .role()
        .is_some_and(|role| authorize(role, operation));

    if allowed {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "You are not allowed to perform this operation"
            })),
        )
            .into_response())
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Maps a ledger error to an HTTP response.
pub(crate) fn ledger_error_response(err: &LedgerError) -> Response {
    let body = match err {
        LedgerError::ValidationFailed { violations } => json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string(),
            "violations": violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
        }),
        _ => json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string(),
        }),
    };

    (status_from(err.http_status_code()), Json(body)).into_response()
}

/// Maps a chart of accounts error to an HTTP response.
pub(crate) fn coa_error_response(err: &CoaError) -> Response {
    (
        status_from(err.http_status_code()),
        Json(json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

/// Maps a report error to an HTTP response.
pub(crate) fn report_error_response(err: &ReportError) -> Response {
    (
        status_from(err.http_status_code()),
        Json(json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}
