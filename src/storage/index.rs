// Clip index - sidecar JSON file describing each clip in the recordings directory
// Follows the same load/save pattern as the other file-backed stores: a missing
// file is an empty index, saves go through temp file + rename.

use super::traits::StorageBackend;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One clip as remembered by the index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// File name of the clip inside the recordings directory
    pub id: String,
    /// User-facing name
    pub display_name: String,
    /// When the clip was recorded
    pub created_at: DateTime<Utc>,
    /// Cached length of the clip
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// In-memory view of the sidecar index, keyed by clip id
#[derive(Debug)]
pub struct ClipIndex {
    entries: HashMap<String, IndexEntry>,
    path: PathBuf,
}

impl ClipIndex {
    pub fn new(path: PathBuf) -> Self {
        Self {
            entries: HashMap::new(),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory entries with the ones on disk.
    ///
    /// A missing, unreadable or malformed index leaves the store empty; the
    /// index only caches what can be rebuilt from the directory itself.
    pub async fn load(&mut self, storage: &dyn StorageBackend) {
        self.entries.clear();

        let bytes = match storage.read_file(&self.path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                crate::debug!("No clip index at {:?}, starting empty", self.path);
                return;
            }
            Err(e) => {
                crate::warn!("Failed to read clip index: {}", e);
                return;
            }
        };

        match serde_json::from_slice::<Vec<IndexEntry>>(&bytes) {
            Ok(entries) => {
                for entry in entries {
                    self.entries.insert(entry.id.clone(), entry);
                }
                crate::debug!("Loaded {} clip index entries", self.entries.len());
            }
            Err(e) => crate::warn!("Ignoring malformed clip index {:?}: {}", self.path, e),
        }
    }

    /// Persist the entries, newest first for readability.
    pub async fn save(&self, storage: &dyn StorageBackend) {
        let mut entries: Vec<&IndexEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let content = match serde_json::to_vec_pretty(&entries) {
            Ok(content) => content,
            Err(e) => {
                crate::warn!("Failed to serialize clip index: {}", e);
                return;
            }
        };

        if let Err(e) = storage.write_file_atomic(&self.path, &content).await {
            crate::warn!("Failed to persist clip index: {}", e);
        }
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn upsert(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<IndexEntry> {
        self.entries.remove(id)
    }

    /// Drop every entry whose id is not in `live`
    pub fn retain_ids(&mut self, live: &[String]) {
        self.entries.retain(|id, _| live.iter().any(|l| l == id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod tests;
