// Clip catalog store - materializes the ordered clip list from the recordings directory

use super::record::{
    display_name_from_filename, renamed_filename, validate_display_name, with_counter, ClipRecord,
};
use crate::audio::PlaybackDevice;
use crate::playback::PlaybackState;
use crate::storage::{ClipIndex, IndexEntry, StorageBackend, StorageError};
use crate::util::{ProbePolicy, RecorderSettings};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How many numbered variants of a generated file name are tried before giving up
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Errors raised while building or mutating the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised by [`ClipCatalog::rename`]
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    #[error("Invalid clip name: {0}")]
    InvalidName(String),
    #[error("Clip {0} not found")]
    NotFound(String),
    #[error("A clip named {0} already exists")]
    Collision(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// In-memory ordered collection of clips reflecting the recordings directory
pub struct ClipCatalog {
    storage: Arc<dyn StorageBackend>,
    /// Device used to measure durations during reload (None = probe on play)
    prober: Option<Arc<dyn PlaybackDevice>>,
    dir: PathBuf,
    index: ClipIndex,
    index_loaded: bool,
    /// Newest first
    records: Vec<ClipRecord>,
}

impl ClipCatalog {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        playback: Arc<dyn PlaybackDevice>,
        settings: &RecorderSettings,
    ) -> Self {
        let prober = match settings.duration_probe {
            ProbePolicy::Eager => Some(playback),
            ProbePolicy::OnPlay => None,
        };
        Self {
            storage,
            prober,
            dir: settings.recordings_dir.clone(),
            index: ClipIndex::new(settings.index_path()),
            index_loaded: false,
            records: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records in display order (newest first)
    pub fn records(&self) -> &[ClipRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ClipRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rebuild the record list from storage.
    ///
    /// Records already in memory keep their creation time and cached duration.
    /// A recordings directory that does not exist (or was just created) is an
    /// empty catalog, not an error.
    pub async fn reload(&mut self) -> Result<&[ClipRecord], CatalogError> {
        crate::debug!("Reloading clip catalog from {:?}", self.dir);

        if self.storage.ensure_dir(&self.dir).await? {
            crate::info!("Created recordings directory {:?}", self.dir);
            self.reset();
            return Ok(&self.records);
        }

        let names = match self.storage.list_entries(&self.dir).await {
            Ok(names) => names,
            Err(e) if e.is_not_found() => {
                crate::warn!("Recordings directory vanished during reload: {}", e);
                self.reset();
                return Ok(&self.records);
            }
            Err(e) => return Err(e.into()),
        };

        self.ensure_index_loaded().await;

        let previous: HashMap<&str, &ClipRecord> =
            self.records.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut next = Vec::with_capacity(names.len());
        for name in names {
            if self.is_reserved(&name) {
                continue;
            }

            let location = self.dir.join(&name);
            let stat = self.storage.stat(&location).await?;
            if !stat.exists {
                crate::debug!("Skipping {} (removed during reload)", name);
                continue;
            }

            let record = match previous.get(name.as_str()) {
                Some(existing) => ClipRecord {
                    location,
                    playback_state: PlaybackState::Idle,
                    ..(*existing).clone()
                },
                None => {
                    let indexed = self.index.get(&name);
                    ClipRecord {
                        display_name: indexed
                            .map(|e| e.display_name.clone())
                            .unwrap_or_else(|| display_name_from_filename(&name)),
                        created_at: indexed
                            .map(|e| e.created_at)
                            .or(stat.modified)
                            .unwrap_or_else(Utc::now),
                        duration_secs: indexed.and_then(|e| e.duration_secs),
                        id: name,
                        location,
                        playback_state: PlaybackState::Idle,
                    }
                }
            };
            next.push(record);
        }
        drop(previous);

        if let Some(prober) = &self.prober {
            for record in next.iter_mut().filter(|r| r.duration_secs.is_none()) {
                record.duration_secs = probe_duration(prober.as_ref(), &record.location).await;
            }
        }

        sort_newest_first(&mut next);
        self.records = next;
        self.sync_index().await;

        crate::debug!("Catalog holds {} clips", self.records.len());
        Ok(&self.records)
    }

    /// Move a finished capture into the recordings directory under `filename`.
    ///
    /// If the name is taken a counter is appended. Returns the id of the new clip.
    /// The record itself appears on the next [`reload`](Self::reload).
    pub async fn adopt(
        &mut self,
        temp_path: &Path,
        filename: &str,
        display_name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<String, CatalogError> {
        self.storage.ensure_dir(&self.dir).await?;

        let mut candidate = filename.to_string();
        let mut attempt = 0;
        loop {
            let target = self.dir.join(&candidate);
            match self.storage.move_file(temp_path, &target).await {
                Ok(()) => break,
                Err(StorageError::AlreadyExists(_)) if attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                    candidate = with_counter(filename, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }

        crate::info!("Saved recording as {}", candidate);

        self.ensure_index_loaded().await;
        self.index.upsert(IndexEntry {
            id: candidate.clone(),
            display_name: display_name.to_string(),
            created_at,
            duration_secs: None,
        });
        self.index.save(self.storage.as_ref()).await;

        Ok(candidate)
    }

    /// Rename a clip, regenerating its file name around the preserved suffix.
    ///
    /// The record is replaced in a single assignment, so readers never observe
    /// a half-renamed clip. Returns the renamed record.
    pub async fn rename(&mut self, id: &str, new_name: &str) -> Result<ClipRecord, RenameError> {
        let name = validate_display_name(new_name).map_err(RenameError::InvalidName)?;
        let position = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RenameError::NotFound(id.to_string()))?;

        let mut renamed = self.records[position].clone();
        let new_id = renamed_filename(&renamed.id, name);

        if new_id != renamed.id {
            if self.contains(&new_id) {
                return Err(RenameError::Collision(new_id));
            }
            let new_location = self.dir.join(&new_id);
            if self.storage.stat(&new_location).await?.exists {
                return Err(RenameError::Collision(new_id));
            }

            self.storage
                .move_file(&renamed.location, &new_location)
                .await
                .map_err(|e| match e {
                    StorageError::AlreadyExists(_) => RenameError::Collision(new_id.clone()),
                    other => RenameError::Storage(other),
                })?;

            renamed.id = new_id;
            renamed.location = new_location;
        }
        renamed.display_name = name.to_string();

        self.ensure_index_loaded().await;
        self.index.remove(id);
        self.index.upsert(index_entry(&renamed));
        self.index.save(self.storage.as_ref()).await;

        self.records[position] = renamed.clone();
        crate::info!("Renamed clip {} to {}", id, renamed.id);
        Ok(renamed)
    }

    /// Delete a clip's backing file and drop it from the catalog.
    ///
    /// Unknown ids and files that are already gone count as success.
    /// Returns whether a record was removed.
    pub async fn remove(&mut self, id: &str) -> Result<bool, CatalogError> {
        let Some(record) = self.get(id) else {
            crate::debug!("Delete of unknown clip {} ignored", id);
            return Ok(false);
        };
        let location = record.location.clone();

        match self.storage.remove(&location).await {
            Ok(()) => crate::info!("Deleted clip {}", id),
            Err(e) if e.is_not_found() => crate::debug!("Clip file {} already gone", id),
            Err(e) => return Err(e.into()),
        }

        self.records.retain(|r| r.id != id);
        self.ensure_index_loaded().await;
        self.index.remove(id);
        self.index.save(self.storage.as_ref()).await;
        Ok(true)
    }

    /// Cache a duration learned outside of reload (e.g. while playing)
    pub async fn set_duration(&mut self, id: &str, duration_secs: f64) {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        if record.duration_secs == Some(duration_secs) {
            return;
        }
        record.duration_secs = Some(duration_secs);
        let entry = index_entry(record);

        self.ensure_index_loaded().await;
        self.index.upsert(entry);
        self.index.save(self.storage.as_ref()).await;
    }

    /// Files in the recordings directory that are not clips
    fn is_reserved(&self, name: &str) -> bool {
        name.starts_with('.')
            || name.ends_with(".tmp")
            || self.index.path().file_name().and_then(|n| n.to_str()) == Some(name)
    }

    fn reset(&mut self) {
        self.records.clear();
        self.index = ClipIndex::new(self.index.path().to_path_buf());
        self.index_loaded = true;
    }

    async fn ensure_index_loaded(&mut self) {
        if !self.index_loaded {
            self.index.load(self.storage.as_ref()).await;
            self.index_loaded = true;
        }
    }

    /// Bring the index in line with the records, writing only on change
    async fn sync_index(&mut self) {
        let live: Vec<String> = self.records.iter().map(|r| r.id.clone()).collect();
        let mut dirty = self.index.len() != live.len();

        for record in &self.records {
            let entry = index_entry(record);
            if self.index.get(&entry.id) != Some(&entry) {
                self.index.upsert(entry);
                dirty = true;
            }
        }
        self.index.retain_ids(&live);

        if dirty {
            self.index.save(self.storage.as_ref()).await;
        }
    }
}

fn index_entry(record: &ClipRecord) -> IndexEntry {
    IndexEntry {
        id: record.id.clone(),
        display_name: record.display_name.clone(),
        created_at: record.created_at,
        duration_secs: record.duration_secs,
    }
}

fn sort_newest_first(records: &mut [ClipRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Load the clip, measure it, unload it
async fn probe_duration(device: &dyn PlaybackDevice, location: &Path) -> Option<f64> {
    let mut handle = match device.open_for_playback(location).await {
        Ok(handle) => handle,
        Err(e) => {
            crate::warn!("Failed to open {:?} for duration probe: {}", location, e);
            return None;
        }
    };

    let probed = handle.probe_duration().await;
    if let Err(e) = handle.release().await {
        crate::warn!("Failed to release probe handle for {:?}: {}", location, e);
    }

    match probed {
        Ok(duration) => Some(duration.as_secs_f64()),
        Err(e) => {
            crate::warn!("Failed to probe duration of {:?}: {}", location, e);
            None
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
