//! Distributed cache tier: a key/value store shared between processes.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::error::CacheResult;

/// Keys fetched per SCAN round trip.
const SCAN_BATCH: usize = 200;

/// A shared key/value backend with per-key expiry.
#[async_trait]
pub trait DistributedCache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl_secs`.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// Delete every key starting with `prefix`. Returns how many were removed.
    async fn clear_prefix(&self, prefix: &str) -> CacheResult<usize>;

    /// Number of keys starting with `prefix`.
    async fn key_count(&self, prefix: &str) -> CacheResult<usize>;

    /// Round-trip health check.
    async fn ping(&self) -> CacheResult<()>;

    /// Backend name (for logging).
    fn backend_name(&self) -> &str;
}

/// Redis backend over one multiplexed connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    /// Connect and PING. Fails if the server is unreachable.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        let cache = Self { conn };
        cache.ping().await?;
        tracing::info!("connected to redis");
        Ok(cache)
    }

    /// All keys matching `<prefix>*`, via cursor-based SCAN.
    async fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }
}

#[async_trait]
impl DistributedCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let keys = self.scan_prefix(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let removed: usize = conn.del(keys).await?;
        Ok(removed)
    }

    async fn key_count(&self, prefix: &str) -> CacheResult<usize> {
        Ok(self.scan_prefix(prefix).await?.len())
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        // nothing listens on port 1
        let result = RedisCache::connect("redis://127.0.0.1:1/").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn invalid_url_fails() {
        let result = RedisCache::connect("not a url").await;
        assert!(result.is_err());
    }
}
