//! Test doubles for the LLM client and the distributed cache.
//!
//! Both record what they were asked so tests can assert on call counts,
//! prompts and stored keys.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sift_protocol::FilterSpec;

use crate::cache::DistributedCache;
use crate::error::{CacheError, CacheResult, LlmError, LlmResult};
use crate::llm::LlmClient;

#[derive(Clone)]
enum MockReply {
    Text(String),
    Fail(fn() -> LlmError),
}

/// Scripted `LlmClient`.
pub struct MockLlmClient {
    reply: Mutex<MockReply>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockLlmClient {
    /// Always answers with `text`.
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Mutex::new(MockReply::Text(text.to_string())),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with the error `make` builds.
    pub fn failing(make: fn() -> LlmError) -> Self {
        Self {
            reply: Mutex::new(MockReply::Fail(make)),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change the scripted answer.
    pub fn set_reply(&self, text: &str) {
        *self.reply.lock().unwrap() = MockReply::Text(text.to_string());
    }

    /// Number of `chat` calls so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(s, _)| s.clone())
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(_, u)| u.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> LlmResult<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(make) => Err(make()),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// In-memory `DistributedCache` that can be switched offline.
pub struct MockDistributedCache {
    entries: Mutex<HashMap<String, (String, Option<u64>)>>,
    online: Mutex<bool>,
}

impl MockDistributedCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            online: Mutex::new(true),
        }
    }

    /// While offline every call fails with a backend error.
    pub fn set_online(&self, online: bool) {
        *self.online.lock().unwrap() = online;
    }

    /// Seed an entry without a TTL.
    pub fn insert(&self, key: &str, spec: &FilterSpec) {
        let json = serde_json::to_string(spec).unwrap();
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (json, None));
    }

    /// TTL recorded for `key`, if it was written with one.
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entries.lock().unwrap().get(key).and_then(|(_, ttl)| *ttl)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> CacheResult<()> {
        if *self.online.lock().unwrap() {
            Ok(())
        } else {
            Err(CacheError::Backend("mock backend offline".into()))
        }
    }
}

impl Default for MockDistributedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DistributedCache for MockDistributedCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_online()?;
        Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.check_online()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Some(ttl_secs)));
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> CacheResult<usize> {
        self.check_online()?;
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }

    async fn key_count(&self, prefix: &str) -> CacheResult<usize> {
        self.check_online()?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .count())
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check_online()
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn llm_mock_records_prompts() {
        let mock = MockLlmClient::replying("{}");
        assert_eq!(mock.chat("sys", "user").await.unwrap(), "{}");
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_system_prompt().as_deref(), Some("sys"));

        mock.set_reply("ok");
        assert_eq!(mock.chat("sys", "again").await.unwrap(), "ok");
        assert_eq!(mock.last_user_prompt().as_deref(), Some("again"));
    }

    #[tokio::test]
    async fn failing_mock_warmup_is_false() {
        let mock = MockLlmClient::failing(|| LlmError::Timeout(1));
        assert!(!mock.warmup().await);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn cache_mock_prefix_ops() {
        let cache = MockDistributedCache::new();
        cache.set_ex("query:a", "{}", 10).await.unwrap();
        cache.set_ex("other:b", "{}", 10).await.unwrap();
        assert_eq!(cache.key_count("query:").await.unwrap(), 1);
        assert_eq!(cache.clear_prefix("query:").await.unwrap(), 1);
        assert_eq!(cache.keys(), vec!["other:b".to_string()]);
    }

    #[tokio::test]
    async fn offline_cache_mock_errors() {
        let cache = MockDistributedCache::new();
        cache.set_online(false);
        assert!(cache.get("query:a").await.is_err());
        assert!(cache.ping().await.is_err());
        cache.set_online(true);
        assert!(cache.ping().await.is_ok());
    }
}
