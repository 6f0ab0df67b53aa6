//! Cache inspection and maintenance endpoints.

use axum::Json;
use axum::extract::State;
use sift_protocol::{CacheStats, ClearReport};

use crate::state::AppState;

/// GET /api/v1/cache/stats
pub async fn stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.resolver.cache_stats().await)
}

/// DELETE /api/v1/cache: drop every cached resolution.
pub async fn clear(State(state): State<AppState>) -> Json<ClearReport> {
    let report = state.resolver.clear_cache().await;
    tracing::info!(
        memory = report.memory,
        distributed = report.distributed,
        snapshot = report.snapshot,
        "query cache cleared"
    );
    Json(report)
}
