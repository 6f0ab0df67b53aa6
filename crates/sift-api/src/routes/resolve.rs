//! Query resolution endpoint.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use sift_protocol::Resolution;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub query: String,
}

/// GET /api/v1/resolve: resolve free text to a filter and report the tier.
pub async fn resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveQuery>,
) -> Json<Resolution> {
    Json(state.resolver.resolve_with_tier(&params.query).await)
}
