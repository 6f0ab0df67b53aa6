//! Sift query-resolution engine.
//!
//! Turns a free-text user search ("women with a profile pic, newest first")
//! into a `FilterSpec`. Resolution is tiered: a three-level cache, an
//! exact-pattern table, keyword heuristics over a normalized query, and
//! finally an LLM. Every successful answer is written back to the cache.

pub mod ai;
pub mod cache;
pub mod config;
pub mod detectors;
pub mod error;
pub mod heuristic;
pub mod llm;
pub mod mock;
pub mod normalize;
pub mod patterns;
pub mod resolver;
pub mod tier;
pub mod vocab;

// Re-export key types for convenience
pub use ai::{AiParser, AiTier};
pub use cache::{CacheManager, DistributedCache, RedisCache, Snapshot};
pub use config::{CacheConfig, EngineConfig, LlmConfig};
pub use error::{AiError, CacheError, CacheResult, LlmError, LlmResult};
pub use heuristic::{HeuristicParser, HeuristicTier};
pub use llm::{LlmClient, OllamaClient};
pub use mock::{MockDistributedCache, MockLlmClient};
pub use normalize::normalize;
pub use patterns::PatternTable;
pub use resolver::Resolver;
pub use tier::{QueryForms, QueryTier};
