//! Shared test harness for E2E integration tests.
//!
//! Wires a real `Resolver` (with mock LLM and distributed backends where a
//! scenario needs them) into the Axum router and the in-memory record store.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sift_api::routes::build_router;
use sift_api::state::AppState;
use sift_api::store::MemoryRecordStore;
use sift_engine::{CacheManager, LlmClient, MockDistributedCache, MockLlmClient, Resolver};

/// A reply the mock model gives for name searches.
pub const AI_FIND_BOB: &str = r#"{"gender":null,"name_substr":"Bob","starts_with_mode":false,"name_length_parity":null,"has_profile_pic":null,"sort_by":null,"sort_order":"desc"}"#;

/// End-to-end harness: resolver + router sharing one cache.
pub struct TestHarness {
    pub resolver: Arc<Resolver>,
    pub router: Router,
    pub llm: Arc<MockLlmClient>,
    pub distributed: Arc<MockDistributedCache>,
}

impl TestHarness {
    /// Mock model with the given reply and an online mock distributed cache.
    pub fn with_llm_reply(reply: &str) -> Self {
        Self::build(Arc::new(MockLlmClient::replying(reply)))
    }

    pub fn with_llm(llm: MockLlmClient) -> Self {
        Self::build(Arc::new(llm))
    }

    fn build(llm: Arc<MockLlmClient>) -> Self {
        let distributed = Arc::new(MockDistributedCache::new());
        let cache = CacheManager::in_memory().with_distributed(distributed.clone());
        let resolver = Arc::new(Resolver::new(
            Arc::new(cache),
            Some(llm.clone() as Arc<dyn LlmClient>),
            Duration::from_millis(200),
        ));
        let state = AppState::new(
            resolver.clone(),
            Arc::new(MemoryRecordStore::with_sample_data()),
        );

        Self {
            router: build_router(state),
            resolver,
            llm,
            distributed,
        }
    }

    /// GET a path and return (status, JSON body).
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    /// Search via the REST API.
    pub async fn search(&self, query: &str) -> serde_json::Value {
        let (status, json) = self.get(&format!("/api/v1/search?query={}", encode(query))).await;
        assert_eq!(status, StatusCode::OK, "search for '{query}' failed: {json}");
        json
    }

    /// Resolve via the REST API.
    pub async fn resolve(&self, query: &str) -> serde_json::Value {
        let (status, json) = self.get(&format!("/api/v1/resolve?query={}", encode(query))).await;
        assert_eq!(status, StatusCode::OK);
        json
    }
}

/// Minimal percent-encoding for test query strings.
pub fn encode(query: &str) -> String {
    query
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
