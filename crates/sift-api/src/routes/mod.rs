//! API route definitions and router builder.

pub mod cache;
pub mod health;
pub mod resolve;
pub mod search;

use axum::Router;
use axum::routing::{delete, get};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/resolve", get(resolve::resolve))
        .route("/search", get(search::search))
        // Cache maintenance
        .route("/cache/stats", get(cache::stats))
        .route("/cache", delete(cache::clear));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::with_sample_data())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (status, json) = get_json(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn resolve_reports_tier() {
        let (status, json) = get_json(app(), "/api/v1/resolve?query=longest%20username").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tier"], "heuristic");
        assert_eq!(json["filters"]["sort_by"], "username_length");
        assert_eq!(json["filters"]["sort_order"], "desc");
    }

    #[tokio::test]
    async fn resolve_without_query_is_fallback() {
        let (status, json) = get_json(app(), "/api/v1/resolve").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tier"], "fallback");
        assert_eq!(json["filters"]["query_understood"], true);
    }

    #[tokio::test]
    async fn search_by_gender() {
        let (status, json) = get_json(app(), "/api/v1/search?query=female%20users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 5);
        assert_eq!(json["total"], 5);
        assert_eq!(json["has_more"], false);
        assert_eq!(json["message"], "Search completed successfully");
        assert_eq!(json["filters_applied"]["gender"], "Female");
    }

    #[tokio::test]
    async fn search_combines_filters() {
        let (_, json) = get_json(
            app(),
            "/api/v1/search?query=female%20users%20with%20profile%20picture",
        )
        .await;
        assert_eq!(json["count"], 3);
        assert_eq!(json["filters_applied"]["profile_picture"], "has profile picture");
        for user in json["results"].as_array().unwrap() {
            assert_eq!(user["gender"], "Female");
        }
    }

    #[tokio::test]
    async fn search_paginates() {
        let (_, json) = get_json(app(), "/api/v1/search?query=all%20users&skip=5&limit=5").await;
        assert_eq!(json["count"], 5);
        assert_eq!(json["total"], 12);
        assert_eq!(json["has_more"], true);
        assert!(json["filters_applied"].is_null());
    }

    #[tokio::test]
    async fn search_not_understood_shows_everyone() {
        let (status, json) =
            get_json(app(), "/api/v1/search?query=names%20that%20end%20with%20n").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["query_understood"], false);
        assert_eq!(json["total"], 12);
        assert_eq!(
            json["message"],
            "Query could not be fully understood - showing all users"
        );
        assert_eq!(json["parse_warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_with_no_matches() {
        let (_, json) = get_json(app(), "/api/v1/search?query=users%20named%20xylophone").await;
        assert_eq!(json["count"], 0);
        assert_eq!(json["message"], "No users found matching your search criteria");
    }

    #[tokio::test]
    async fn search_rejects_bad_limit() {
        for uri in ["/api/v1/search?query=x&limit=0", "/api/v1/search?query=x&limit=201"] {
            let (status, json) = get_json(app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["status"], 400);
        }
    }

    #[tokio::test]
    async fn cache_stats_and_clear() {
        let app = app();
        get_json(app.clone(), "/api/v1/resolve?query=male%20users").await;

        let (status, stats) = get_json(app.clone(), "/api/v1/cache/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["memory_entries"], 2);
        assert_eq!(stats["distributed_connected"], false);

        let response = app
            .clone()
            .oneshot(
                Request::delete("/api/v1/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["memory"], 2);

        let (_, stats) = get_json(app, "/api/v1/cache/stats").await;
        assert_eq!(stats["memory_entries"], 0);
    }
}
