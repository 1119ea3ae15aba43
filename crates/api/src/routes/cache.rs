//! Cache management routes (admin only).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde_json::json;
use tracing::info;

use crate::routes::require;
use crate::{AppState, middleware::AuthUser};
use ledgerly_core::authz::Operation;

/// Creates the cache management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cache/stats", get(cache_stats))
        .route("/cache", delete(flush_cache))
}

/// GET `/cache/stats` - Current cache entry count and TTL settings.
async fn cache_stats(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ManageCache) {
        return response;
    }

    (
        StatusCode::OK,
        Json(json!({
            "entries": state.report_cache.entry_count(),
            "report_ttl_secs": state.config.cache.report_ttl_secs,
            "transaction_ttl_secs": state.config.cache.transaction_ttl_secs,
        })),
    )
        .into_response()
}

/// DELETE `/cache` - Flush every cached report and balance read.
async fn flush_cache(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require(&auth, Operation::ManageCache) {
        return response;
    }

    state.report_cache.invalidate_all();
    info!(actor = %auth.user_id(), "Report cache flushed");

    (StatusCode::NO_CONTENT, ()).into_response()
}
