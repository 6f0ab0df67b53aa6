//! Three-tier query cache.
//!
//! - **memory**: in-process map, keyed by both the raw and normalized query.
//! - **distributed** (optional): shared backend keyed `query:<normalized>`
//!   with a TTL.
//! - **snapshot** (optional): JSON file on disk, flushed every N writes and
//!   on shutdown, reloaded at startup.
//!
//! A failing tier is logged and skipped; cache errors never reach the caller.

pub mod distributed;
pub mod snapshot;

pub use distributed::{DistributedCache, RedisCache};
pub use snapshot::Snapshot;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sift_protocol::{CacheStats, ClearReport, FilterSpec};
use tokio::sync::{Mutex, RwLock};

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::normalize::normalize;

/// Namespace for distributed keys. Clearing never touches keys outside it.
pub const KEY_PREFIX: &str = "query:";

pub struct CacheManager {
    memory: RwLock<HashMap<String, FilterSpec>>,
    distributed: Option<Arc<dyn DistributedCache>>,
    snapshot: Option<Snapshot>,
    /// Serializes snapshot writes with each other and with `clear_all`.
    /// Taken before `memory` whenever both are held.
    snapshot_io: Mutex<()>,
    flush_every: u64,
    ttl_secs: u64,
    writes: AtomicU64,
}

impl CacheManager {
    /// Memory-only cache.
    pub fn in_memory() -> Self {
        let defaults = CacheConfig::default();
        Self {
            memory: RwLock::new(HashMap::new()),
            distributed: None,
            snapshot: None,
            snapshot_io: Mutex::new(()),
            flush_every: defaults.flush_every,
            ttl_secs: defaults.ttl_secs,
            writes: AtomicU64::new(0),
        }
    }

    pub fn with_distributed(mut self, backend: Arc<dyn DistributedCache>) -> Self {
        self.distributed = Some(backend);
        self
    }

    /// Attach a snapshot file and load its entries into memory.
    pub async fn with_snapshot(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        let snapshot = Snapshot::new(path);
        match snapshot.load().await {
            Ok(entries) => {
                tracing::info!(
                    path = %snapshot.path().display(),
                    entries = entries.len(),
                    "loaded cache snapshot"
                );
                self.memory.get_mut().extend(entries);
            }
            Err(e) => {
                tracing::warn!(path = %snapshot.path().display(), error = %e, "could not load cache snapshot");
            }
        }
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_flush_every(mut self, n: u64) -> Self {
        self.flush_every = n;
        self
    }

    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Build from config. An unreachable Redis degrades to memory + snapshot.
    pub async fn from_config(config: &CacheConfig) -> Self {
        let mut manager = Self::in_memory()
            .with_flush_every(config.flush_every)
            .with_ttl_secs(config.ttl_secs);

        if let Some(url) = &config.redis_url {
            match RedisCache::connect(url).await {
                Ok(redis) => manager = manager.with_distributed(Arc::new(redis)),
                Err(e) => {
                    tracing::warn!(error = %e, "redis unavailable, continuing without distributed cache");
                }
            }
        }
        if let Some(path) = &config.snapshot_path {
            manager = manager.with_snapshot(path).await;
        }
        manager
    }

    fn distributed_key(normalized: &str) -> String {
        format!("{KEY_PREFIX}{normalized}")
    }

    /// Look up a query: distributed (normalized key), then memory by raw
    /// key, then memory by normalized key. A query that normalizes to
    /// nothing only matches its raw key.
    pub async fn get(&self, query: &str) -> Option<FilterSpec> {
        let normalized = normalize(query);
        let shared = !normalized.is_empty();

        if shared && let Some(hit) = self.get_distributed(&normalized).await {
            tracing::debug!(query, tier = "distributed", "cache hit");
            self.memory
                .write()
                .await
                .insert(query.to_string(), hit.clone());
            return Some(hit);
        }

        {
            let memory = self.memory.read().await;
            if let Some(hit) = memory.get(query) {
                tracing::debug!(query, tier = "memory", "cache hit");
                return Some(hit.clone());
            }
        }

        let hit = if shared {
            self.memory.read().await.get(&normalized).cloned()
        } else {
            None
        };
        if let Some(hit) = hit {
            tracing::debug!(query, normalized = %normalized, tier = "memory", "normalized cache hit");
            self.memory
                .write()
                .await
                .insert(query.to_string(), hit.clone());
            return Some(hit);
        }

        tracing::debug!(query, "cache miss");
        None
    }

    async fn get_distributed(&self, normalized: &str) -> Option<FilterSpec> {
        let backend = self.distributed.as_ref()?;
        let key = Self::distributed_key(normalized);
        match backend.get(&key).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "corrupt distributed cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(backend = backend.backend_name(), error = %e, "distributed cache read failed");
                None
            }
        }
    }

    /// Store a resolution under the raw and normalized keys in every tier.
    /// An empty normalized form is never used as a key.
    pub async fn put(&self, query: &str, spec: &FilterSpec) {
        let normalized = normalize(query);
        let shared = !normalized.is_empty();

        if shared && let Some(backend) = &self.distributed {
            let key = Self::distributed_key(&normalized);
            let result = match serde_json::to_string(spec) {
                Ok(json) => backend.set_ex(&key, &json, self.ttl_secs).await,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = result {
                tracing::warn!(backend = backend.backend_name(), error = %e, "distributed cache write failed");
            }
        }

        {
            let mut memory = self.memory.write().await;
            memory.insert(query.to_string(), spec.clone());
            if shared {
                memory.insert(normalized, spec.clone());
            }
        }

        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if self.flush_every > 0
            && writes % self.flush_every == 0
            && let Err(e) = self.flush().await
        {
            tracing::warn!(error = %e, "periodic snapshot flush failed");
        }
    }

    /// Write the memory tier to the snapshot file, if one is configured.
    pub async fn flush(&self) -> CacheResult<()> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        let _io = self.snapshot_io.lock().await;
        let memory = self.memory.read().await.clone();
        snapshot.save(&memory).await?;
        tracing::debug!(path = %snapshot.path().display(), entries = memory.len(), "cache snapshot flushed");
        Ok(())
    }

    /// Final flush at process exit.
    pub async fn shutdown(&self) {
        match self.flush().await {
            Ok(()) => tracing::info!("cache flushed on shutdown"),
            Err(e) => tracing::warn!(error = %e, "cache flush on shutdown failed"),
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let memory_entries = self.memory.read().await.len();

        let (distributed_connected, distributed_keys) = match &self.distributed {
            Some(backend) => match backend.key_count(KEY_PREFIX).await {
                Ok(count) => (true, Some(count)),
                Err(e) => {
                    tracing::warn!(backend = backend.backend_name(), error = %e, "distributed cache stats failed");
                    (false, None)
                }
            },
            None => (false, None),
        };

        let (snapshot_path, snapshot_exists) = match &self.snapshot {
            Some(snapshot) => (
                Some(snapshot.path().display().to_string()),
                snapshot.exists().await,
            ),
            None => (None, false),
        };

        CacheStats {
            memory_entries,
            distributed_connected,
            distributed_keys,
            snapshot_path,
            snapshot_exists,
            writes_since_start: self.writes.load(Ordering::Relaxed),
        }
    }

    /// Empty every tier. Distributed deletes only `query:*` keys.
    pub async fn clear_all(&self) -> ClearReport {
        // Held to the end so a concurrent flush cannot write back old entries.
        let _io = self.snapshot_io.lock().await;
        let memory = {
            let mut memory = self.memory.write().await;
            let count = memory.len();
            memory.clear();
            count
        };

        let distributed = match &self.distributed {
            Some(backend) => match backend.clear_prefix(KEY_PREFIX).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(backend = backend.backend_name(), error = %e, "distributed cache clear failed");
                    0
                }
            },
            None => 0,
        };

        let snapshot = match &self.snapshot {
            Some(snapshot) => match snapshot.reset().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "snapshot reset failed");
                    false
                }
            },
            None => false,
        };

        tracing::info!(memory, distributed, snapshot, "cache cleared");
        ClearReport {
            memory,
            distributed,
            snapshot,
        }
    }
}
