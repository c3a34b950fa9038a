//! C10: loads, queries, updates, and persists the per-file incremental
//! build cache (spec.md §4.10, §6.4).

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use solgen_hir::FileInfo;
use thiserror::Error;

pub const SCHEMA_VERSION: &str = "2.0";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to write cache file '{path}': {source}")]
    Write { path: String, source: std::io::Error },
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub version: String,
    pub created_at: u64,
    pub files: HashMap<String, FileInfo>,
}

impl Default for CacheSnapshot {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            created_at: now_unix(),
            files: HashMap::new(),
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The in-memory cache. Lookup/update/evict are O(1) hash-map operations
/// (spec.md §4.10); persistence is a single JSON write.
#[derive(Debug, Clone)]
pub struct Cache {
    snapshot: CacheSnapshot,
}

impl Cache {
    pub fn empty() -> Self {
        Self {
            snapshot: CacheSnapshot::default(),
        }
    }

    /// Loads the persisted snapshot from `path`. Any failure to read,
    /// parse, recognize the schema version, or satisfy `expiry_seconds`
    /// is treated as "start empty" rather than fatal — per spec.md §4.10,
    /// a missing or stale cache file is a normal first-run condition, not
    /// an infrastructure error.
    pub fn load(path: &Path, expiry_seconds: Option<u64>) -> Self {
        let Ok(text) = fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "no cache file found, starting empty");
            return Self::empty();
        };
        let Ok(snapshot) = serde_json::from_str::<CacheSnapshot>(&text) else {
            tracing::warn!(path = %path.display(), "cache file unparseable, starting empty");
            return Self::empty();
        };
        if snapshot.version != SCHEMA_VERSION {
            tracing::warn!(
                found = %snapshot.version,
                expected = SCHEMA_VERSION,
                "cache schema version mismatch, starting empty"
            );
            return Self::empty();
        }
        if let Some(expiry) = expiry_seconds {
            let age = now_unix().saturating_sub(snapshot.created_at);
            if age > expiry {
                tracing::info!(age, expiry, "cache expired, starting empty");
                return Self::empty();
            }
        }
        Self { snapshot }
    }

    pub fn get(&self, path: &str) -> Option<&FileInfo> {
        self.snapshot.files.get(path)
    }

    pub fn upsert(&mut self, info: FileInfo) {
        self.snapshot.files.insert(info.path.clone(), info);
    }

    pub fn remove(&mut self, path: &str) -> Option<FileInfo> {
        self.snapshot.files.remove(path)
    }

    pub fn clear(&mut self) {
        self.snapshot.files.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshot.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.files.is_empty()
    }

    /// Writes the snapshot to `path` via write-to-temp-then-rename so a
    /// crash mid-write leaves the previous snapshot intact (spec.md §5).
    pub fn persist(&self, path: &Path) -> Result<(), CacheError> {
        let text = serde_json::to_string_pretty(&self.snapshot)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, text).map_err(|source| CacheError::Write {
            path: tmp_path.display().to_string(),
            source,
        })?;
        fs::rename(&tmp_path, path).map_err(|source| CacheError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}
