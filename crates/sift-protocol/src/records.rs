//! User records and the record-store contract the resolved filters feed into.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::{FilterSpec, Gender};

/// A searchable user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub full_name: String,
    pub username: String,
    pub gender: Gender,
    /// Stored path or URL of the profile picture, if any.
    #[serde(default)]
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// True when a non-blank picture reference is stored.
    pub fn has_profile_pic(&self) -> bool {
        self.profile_pic
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// Letters in the display name, spaces excluded.
    pub fn name_length(&self) -> usize {
        self.full_name.chars().filter(|c| *c != ' ').count()
    }
}

/// One page of matching records plus the total before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<UserRecord>,
    pub total_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Storage that can apply a `FilterSpec` with pagination.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query(
        &self,
        filters: &FilterSpec,
        limit: usize,
        skip: usize,
    ) -> Result<SearchPage, StoreError>;
}
