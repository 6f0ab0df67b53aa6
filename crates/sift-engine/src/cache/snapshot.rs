//! Durable snapshot: the whole cache as one JSON object on disk.
//!
//! Writes go to a sibling temp file that is then renamed over the target,
//! so a crash mid-write leaves the previous snapshot intact. Writes to one
//! path must not overlap; `CacheManager` serializes them.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;
use sift_protocol::FilterSpec;

use crate::error::CacheResult;

#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries. A missing file is an empty cache; entries that
    /// fail to decode are skipped.
    pub async fn load(&self) -> CacheResult<HashMap<String, FilterSpec>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let raw: HashMap<String, Value> = serde_json::from_str(&contents)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (query, value) in raw {
            match serde_json::from_value::<FilterSpec>(value) {
                Ok(spec) => {
                    entries.insert(query, spec);
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "skipping corrupt snapshot entry");
                }
            }
        }
        Ok(entries)
    }

    /// Atomically replace the snapshot with `entries`.
    pub async fn save(&self, entries: &HashMap<String, FilterSpec>) -> CacheResult<()> {
        let ordered: BTreeMap<&String, &FilterSpec> = entries.iter().collect();
        let json = serde_json::to_string_pretty(&ordered)?;
        self.write_atomic(json.as_bytes()).await
    }

    /// Overwrite the snapshot with an empty object.
    pub async fn reset(&self) -> CacheResult<()> {
        self.write_atomic(b"{}").await
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    async fn write_atomic(&self, bytes: &[u8]) -> CacheResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
