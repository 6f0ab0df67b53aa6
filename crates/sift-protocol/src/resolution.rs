use serde::{Deserialize, Serialize};

use crate::filter::FilterSpec;

/// Which resolution tier produced a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// Served from one of the cache tiers.
    Cache,
    /// Exact match against the common-query table.
    Pattern,
    /// Deterministic keyword rules.
    Heuristic,
    /// Language-model parse.
    Ai,
    /// Nothing resolved; empty filter returned and not cached.
    Fallback,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Cache => "cache",
            ResolutionTier::Pattern => "pattern",
            ResolutionTier::Heuristic => "heuristic",
            ResolutionTier::Ai => "ai",
            ResolutionTier::Fallback => "fallback",
        }
    }
}

/// A resolved filter together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub filters: FilterSpec,
    pub tier: ResolutionTier,
}

impl Resolution {
    pub fn new(filters: FilterSpec, tier: ResolutionTier) -> Self {
        Self { filters, tier }
    }

    /// Empty filter used when every tier missed.
    pub fn fallback() -> Self {
        Self::new(FilterSpec::default(), ResolutionTier::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serialization() {
        assert_eq!(
            serde_json::to_string(&ResolutionTier::Heuristic).unwrap(),
            r#""heuristic""#
        );
        assert_eq!(ResolutionTier::Ai.as_str(), "ai");
    }

    #[test]
    fn fallback_is_empty_and_understood() {
        let r = Resolution::fallback();
        assert_eq!(r.tier, ResolutionTier::Fallback);
        assert!(r.filters.is_empty_filter());
        assert!(r.filters.query_understood);
    }
}
