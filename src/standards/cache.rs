//! Disk-backed verification cache.
//!
//! One JSON file maps `"{code}_{production_date}"` to a verification result
//! and the unix timestamp it was stored at. The file is read fully at load,
//! mutated in memory, and rewritten once per verification batch. Writes
//! within the process are serialized through the mutex; a single-process
//! deployment is assumed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{StandardsError, StandardsResult};
use super::types::CodeVerification;

/// Entries older than this are treated as misses.
pub const CACHE_TTL_SECS: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedEntry {
    timestamp: i64,
    verification: CodeVerification,
}

pub struct VerificationCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, CachedEntry>>,
}

pub fn cache_key(code: &str, production_date: &str) -> String {
    format!("{code}_{production_date}")
}

impl VerificationCache {
    /// Loads the cache file; a missing file starts empty, a corrupt file is
    /// an error.
    pub fn load(path: &Path) -> StandardsResult<Self> {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|e| StandardsError::CacheParse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(StandardsError::CacheRead {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "verification cache loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    /// Fresh cached verification for `(code, production_date)`, if any.
    pub fn get(&self, code: &str, production_date: &str) -> Option<CodeVerification> {
        let entries = self.entries.lock();
        let entry = entries.get(&cache_key(code, production_date))?;
        let age = chrono::Utc::now().timestamp() - entry.timestamp;
        (age < CACHE_TTL_SECS).then(|| entry.verification.clone())
    }

    /// Stores a verification in memory; call [`flush`](Self::flush) to
    /// persist the batch.
    pub fn put(&self, code: &str, production_date: &str, verification: CodeVerification) {
        self.entries.lock().insert(
            cache_key(code, production_date),
            CachedEntry {
                timestamp: chrono::Utc::now().timestamp(),
                verification,
            },
        );
    }

    /// Rewrites the cache file from the in-memory map. The lock is held
    /// across serialize and write so concurrent batches cannot overwrite a
    /// newer snapshot with a stale one.
    pub fn flush(&self) -> StandardsResult<()> {
        let entries = self.entries.lock();
        let serialized =
            serde_json::to_string_pretty(&*entries).map_err(|e| StandardsError::CacheWrite {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StandardsError::CacheWrite {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }
        std::fs::write(&self.path, serialized).map_err(|e| StandardsError::CacheWrite {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}
