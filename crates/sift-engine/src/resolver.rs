//! Tiered query resolution.
//!
//! cache → pattern table → heuristic parser → AI parser. The first tier that
//! answers wins and its answer is written back to every cache tier. When no
//! tier answers, the caller gets an empty filter and nothing is cached.

use std::sync::Arc;
use std::time::Duration;

use sift_protocol::{CacheStats, ClearReport, FilterSpec, Resolution, ResolutionTier};

use crate::ai::AiTier;
use crate::cache::CacheManager;
use crate::config::EngineConfig;
use crate::error::LlmError;
use crate::heuristic::HeuristicTier;
use crate::llm::{LlmClient, OllamaClient};
use crate::normalize::normalize;
use crate::patterns::PatternTable;
use crate::tier::{QueryForms, QueryTier};

pub struct Resolver {
    cache: Arc<CacheManager>,
    tiers: Vec<Box<dyn QueryTier>>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl Resolver {
    /// Standard tier order. The AI tier is added only when a client is given.
    pub fn new(
        cache: Arc<CacheManager>,
        llm: Option<Arc<dyn LlmClient>>,
        ai_timeout: Duration,
    ) -> Self {
        let mut tiers: Vec<Box<dyn QueryTier>> = vec![
            Box::new(PatternTable::new()),
            Box::new(HeuristicTier::new()),
        ];
        if let Some(client) = &llm {
            tiers.push(Box::new(AiTier::new(client.clone(), ai_timeout)));
        }
        Self { cache, tiers, llm }
    }

    /// Custom tier list (tests, or hosts that reorder tiers).
    pub fn with_tiers(cache: Arc<CacheManager>, tiers: Vec<Box<dyn QueryTier>>) -> Self {
        Self {
            cache,
            tiers,
            llm: None,
        }
    }

    /// Build the cache and the LLM client from config.
    pub async fn from_config(config: &EngineConfig) -> Self {
        let cache = Arc::new(CacheManager::from_config(&config.cache).await);
        let llm: Option<Arc<dyn LlmClient>> = match OllamaClient::new(&config.llm) {
            Ok(client) => {
                tracing::info!(url = client.url(), model = %config.llm.model, "AI tier enabled");
                Some(Arc::new(client))
            }
            Err(LlmError::NotConfigured) => {
                tracing::info!("no LLM endpoint configured, AI tier disabled");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not build LLM client, AI tier disabled");
                None
            }
        };
        Self::new(cache, llm, Duration::from_secs(config.llm.ai_timeout_secs))
    }

    /// Resolve a query to a filter. Never fails.
    pub async fn resolve(&self, query: &str) -> FilterSpec {
        self.resolve_with_tier(query).await.filters
    }

    /// Resolve a query and report which tier produced the answer.
    pub async fn resolve_with_tier(&self, query: &str) -> Resolution {
        if query.trim().is_empty() {
            return Resolution::fallback();
        }

        if let Some(hit) = self.cache.get(query).await {
            return Resolution::new(hit, ResolutionTier::Cache);
        }

        let normalized = normalize(query);
        let forms = QueryForms::new(query, &normalized);

        for tier in &self.tiers {
            if let Some(spec) = tier.resolve(&forms).await {
                tracing::info!(
                    query,
                    tier = tier.tier_name(),
                    understood = spec.query_understood,
                    "query resolved"
                );
                self.cache.put(query, &spec).await;
                return Resolution::new(spec, tier.tier());
            }
            tracing::debug!(query, tier = tier.tier_name(), "tier passed");
        }

        tracing::info!(query, "no tier resolved query, returning empty filter");
        Resolution::fallback()
    }

    /// Preload the model, if there is one.
    pub async fn warmup(&self) -> bool {
        match &self.llm {
            Some(client) => client.warmup().await,
            None => false,
        }
    }

    pub async fn clear_cache(&self) -> ClearReport {
        self.cache.clear_all().await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Flush the snapshot before the process exits.
    pub async fn shutdown(&self) {
        self.cache.shutdown().await;
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn has_ai(&self) -> bool {
        self.llm.is_some()
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.tier_name()).collect()
    }
}
