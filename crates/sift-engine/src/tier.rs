//! The resolution tier seam.

use async_trait::async_trait;
use sift_protocol::{FilterSpec, ResolutionTier};

/// A query in the two forms every tier may look at.
#[derive(Debug, Clone, Copy)]
pub struct QueryForms<'a> {
    /// Exactly what the caller sent.
    pub raw: &'a str,
    /// Output of `normalize(raw)`.
    pub normalized: &'a str,
}

impl<'a> QueryForms<'a> {
    pub fn new(raw: &'a str, normalized: &'a str) -> Self {
        Self { raw, normalized }
    }

    /// Whether normalization changed anything beyond case and surrounding whitespace.
    pub fn normalization_changed(&self) -> bool {
        self.raw.trim().to_lowercase() != self.normalized
    }
}

/// One step of the resolution pipeline.
#[async_trait]
pub trait QueryTier: Send + Sync {
    /// Resolve the query, or return `None` to let the next tier try.
    async fn resolve(&self, query: &QueryForms<'_>) -> Option<FilterSpec>;

    /// Which tier a hit from this step is reported as.
    fn tier(&self) -> ResolutionTier;

    /// Name of this tier (for logging).
    fn tier_name(&self) -> &str {
        self.tier().as_str()
    }
}
