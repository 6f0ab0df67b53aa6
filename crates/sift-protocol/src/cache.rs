use serde::{Deserialize, Serialize};

/// Point-in-time view of the query cache tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries in the in-process map (raw and normalized keys both count).
    pub memory_entries: usize,
    /// Whether a distributed backend is configured and answered the last call.
    pub distributed_connected: bool,
    /// Keys under the `query:` namespace, when the backend could be asked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed_keys: Option<usize>,
    /// Location of the durable snapshot, if persistence is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,
    /// Whether the snapshot file currently exists on disk.
    pub snapshot_exists: bool,
    /// Successful cache writes since the process started.
    pub writes_since_start: u64,
}

/// What `clear_all` removed from each tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    /// Entries dropped from the in-process map.
    pub memory: usize,
    /// Namespaced keys deleted from the distributed backend.
    pub distributed: usize,
    /// Whether the snapshot file was reset.
    pub snapshot: bool,
}
