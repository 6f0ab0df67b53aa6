//! Shared application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use sift_engine::{CacheManager, Resolver};
use sift_protocol::RecordStore;

use crate::store::MemoryRecordStore;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Query-to-filter resolution engine.
    pub resolver: Arc<Resolver>,
    /// Backing storage the resolved filters are applied to.
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(resolver: Arc<Resolver>, store: Arc<dyn RecordStore>) -> Self {
        Self { resolver, store }
    }

    /// In-memory cache, no AI tier, sample users (development and tests).
    pub fn with_sample_data() -> Self {
        let resolver = Resolver::new(
            Arc::new(CacheManager::in_memory()),
            None,
            Duration::from_secs(30),
        );
        Self::new(
            Arc::new(resolver),
            Arc::new(MemoryRecordStore::with_sample_data()),
        )
    }
}
