//! Engine error types.
//!
//! None of these reach the caller of `Resolver::resolve`; they are logged and
//! the resolver degrades to the next tier or to an empty filter.

use thiserror::Error;

/// Failure in one cache tier.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Backend(e.to_string())
    }
}

/// Convenience alias for cache results.
pub type CacheResult<T> = Result<T, CacheError>;

/// Failure talking to the language model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM endpoint not configured")]
    NotConfigured,

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM transport error: {0}")]
    Transport(String),

    #[error("LLM returned HTTP {0}")]
    Status(u16),

    #[error("LLM response had no message content")]
    MissingContent,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Transport(e.to_string())
    }
}

/// Convenience alias for LLM client results.
pub type LlmResult<T> = Result<T, LlmError>;

/// Failure of a whole AI parse attempt.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI parse timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Transport(#[from] LlmError),

    #[error("AI response is not a JSON object: {0}")]
    Format(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_error_wraps_into_ai_error() {
        let err: AiError = LlmError::Status(503).into();
        assert!(matches!(err, AiError::Transport(LlmError::Status(503))));
        assert_eq!(err.to_string(), "LLM returned HTTP 503");
    }

    #[test]
    fn codec_error_from_serde() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CacheError = bad.into();
        assert!(err.to_string().starts_with("cache codec error"));
    }
}
