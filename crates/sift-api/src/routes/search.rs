//! Natural-language user search.
//!
//! Resolves the query text to a filter, applies it to the record store and
//! reports what was understood alongside the page of results.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use sift_protocol::UserRecord;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const MAX_LIMIT: usize = 200;

const MSG_NOT_UNDERSTOOD: &str = "Query could not be fully understood - showing all users";
const MSG_FOUND: &str = "Search completed successfully";
const MSG_EMPTY: &str = "No users found matching your search criteria";

/// Query parameters for search requests.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<UserRecord>,
    pub count: usize,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
    pub has_more: bool,
    pub message: &'static str,
    pub query_understood: bool,
    pub parse_warnings: Vec<String>,
    pub filters_applied: Option<BTreeMap<&'static str, String>>,
}

/// GET /api/v1/search: resolve the query and return matching users.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    if !(1..=MAX_LIMIT).contains(&params.limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let filters = state.resolver.resolve(&params.query).await;
    let page = state.store.query(&filters, params.limit, params.skip).await?;

    let count = page.results.len();
    let message = if !filters.query_understood {
        MSG_NOT_UNDERSTOOD
    } else if count > 0 {
        MSG_FOUND
    } else {
        MSG_EMPTY
    };

    tracing::debug!(
        query = %params.query,
        count,
        total = page.total_count,
        understood = filters.query_understood,
        "search served"
    );

    Ok(Json(SearchResponse {
        has_more: params.skip + count < page.total_count,
        filters_applied: filters.applied_filters(),
        query: params.query,
        results: page.results,
        count,
        total: page.total_count,
        skip: params.skip,
        limit: params.limit,
        message,
        query_understood: filters.query_understood,
        parse_warnings: filters.parse_warnings,
    }))
}
