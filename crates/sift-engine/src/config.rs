//! Engine configuration, loadable from TOML or environment.

use serde::{Deserialize, Deserializer};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Cache tier settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Language-model endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Cache tier settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis URL for the distributed tier. None disables it.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Durable snapshot file. None, `""` or `"none"` disables persistence.
    #[serde(
        default = "default_snapshot_path",
        deserialize_with = "deserialize_snapshot_path"
    )]
    pub snapshot_path: Option<String>,
    /// Flush the snapshot every N successful writes.
    #[serde(default = "default_flush_every")]
    pub flush_every: u64,
    /// TTL for distributed entries, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_snapshot_path() -> Option<String> {
    Some("query_cache.json".into())
}

/// Blank and `none` (any case) turn the snapshot off.
fn snapshot_setting(path: String) -> Option<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(path)
    }
}

fn deserialize_snapshot_path<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(snapshot_setting))
}

fn default_flush_every() -> u64 {
    10
}
fn default_ttl_secs() -> u64 {
    86_400
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            snapshot_path: default_snapshot_path(),
            flush_every: default_flush_every(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Ollama-compatible chat endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL, e.g. `http://localhost:11434`. None disables the AI tier.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sent as a bearer token when present.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// End-to-end budget for one AI parse.
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,
    /// HTTP request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Concurrent in-flight chat calls.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Idle keep-alive connections kept per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle: usize,
    /// How long the server keeps the model loaded after a call.
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

fn default_model() -> String {
    "qwen3:4b".into()
}
fn default_ai_timeout_secs() -> u64 {
    30
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_max_in_flight() -> usize {
    10
}
fn default_pool_max_idle() -> usize {
    5
}
fn default_keep_alive() -> String {
    "10m".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: default_model(),
            ai_timeout_secs: default_ai_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_in_flight: default_max_in_flight(),
            pool_max_idle: default_pool_max_idle(),
            keep_alive: default_keep_alive(),
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.llm.base_url = get("OLLAMA_BASE_URL");
        config.llm.api_key = get("OLLAMA_API_KEY");
        if let Some(model) = get("OLLAMA_MODEL") {
            config.llm.model = model;
        }
        if let Some(secs) = get("OLLAMA_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.llm.ai_timeout_secs = secs;
        }

        config.cache.redis_url = get("REDIS_URL");
        if let Some(path) = get("QUERY_CACHE_FILE") {
            config.cache.snapshot_path = snapshot_setting(path);
        }
        if let Some(n) = get("QUERY_CACHE_FLUSH_EVERY").and_then(|s| s.parse().ok()) {
            config.cache.flush_every = n;
        }

        config
    }
}
