//! Language-model client for the AI tier.
//!
//! Talks to an Ollama-compatible `/api/chat` endpoint. One pooled
//! `reqwest::Client` is shared by every request and a semaphore bounds the
//! number of calls in flight. No retries: a failed call fails the AI tier.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::config::LlmConfig;
use crate::error::{LlmError, LlmResult};

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<think>[\s\S]*?</think>").unwrap());

/// Remove `<think>...</think>` reasoning blocks some models emit.
pub fn strip_reasoning(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").trim().to_string()
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one system + user exchange and return the assistant text.
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> LlmResult<String>;

    /// Load the model ahead of the first real query. Never fatal.
    async fn warmup(&self) -> bool {
        match self.chat("Reply with just 'ok'", "hi").await {
            Ok(_) => {
                tracing::info!(model = self.model(), "LLM warmed up");
                true
            }
            Err(e) => {
                tracing::warn!(model = self.model(), error = %e, "LLM warmup failed");
                false
            }
        }
    }

    /// Model identifier (for logging).
    fn model(&self) -> &str;
}

/// Ollama chat API request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    think: bool,
    options: ChatOptions,
    keep_alive: &'a str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    top_p: f64,
}

/// Ollama chat API response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Client for an Ollama-compatible endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    keep_alive: String,
    request_timeout_secs: u64,
    permits: Semaphore,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> LlmResult<Self> {
        let base = config.base_url.as_deref().ok_or(LlmError::NotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/api/chat", base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            keep_alive: config.keep_alive.clone(),
            request_timeout_secs: config.request_timeout_secs,
            permits: Semaphore::new(config.max_in_flight.max(1)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> LlmResult<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: false,
            think: false,
            options: ChatOptions {
                temperature: 0.0,
                top_p: 0.95,
            },
            keep_alive: &self.keep_alive,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.request_timeout_secs)
            } else {
                LlmError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, model = %self.model, "LLM returned non-success status");
            return Err(LlmError::Status(status.as_u16()));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .message
            .map(|m| strip_reasoning(&m.content))
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::MissingContent)?;

        tracing::debug!(model = %self.model, chars = content.len(), "LLM replied");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
