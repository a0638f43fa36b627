//! Recording lifecycle manager.
//!
//! [`RecordingManager`] is the operation surface consumed by the presentation
//! layer. It turns finished captures into cataloged clips and routes playback
//! commands to the [`PlaybackController`].
//!
//! Every operation holds the catalog lock for its whole duration, so commands
//! are applied one at a time and never work from a stale clip list. Locks are
//! always taken in the order catalog, capture, playback slot. Readers use
//! [`RecordingManager::get_clips`] and [`RecordingManager::is_loading`], which
//! return the last published snapshot without waiting on in-flight commands.

use crate::audio::{CaptureDevice, PermissionGate, PlaybackDevice};
use crate::catalog::{generate_filename, CatalogError, ClipCatalog, ClipRecord, RenameError};
use crate::playback::{PlaybackController, PlaybackError};
use crate::recording::{CaptureController, CaptureError, CaptureState, CapturedAudio};
use crate::storage::{FsStorage, StorageBackend};
use crate::util::{RecorderSettings, SettingsError};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Errors returned by manager operations
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Rename(#[from] RenameError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Clip {0} not found")]
    ClipNotFound(String),
}

/// Platform audio implementations the manager drives
#[derive(Clone)]
pub struct AudioBackends {
    pub capture: Arc<dyn CaptureDevice>,
    pub playback: Arc<dyn PlaybackDevice>,
    pub permission: Arc<dyn PermissionGate>,
}

pub struct RecordingManager {
    settings: RecorderSettings,
    catalog: Mutex<ClipCatalog>,
    capture: Mutex<CaptureController>,
    playback: PlaybackController,
    /// Last published clip list (newest first)
    snapshot: RwLock<Vec<ClipRecord>>,
    loading: AtomicBool,
}

impl RecordingManager {
    pub fn new(
        settings: RecorderSettings,
        storage: Arc<dyn StorageBackend>,
        backends: AudioBackends,
    ) -> Self {
        let catalog = ClipCatalog::new(storage, backends.playback.clone(), &settings);
        let capture = CaptureController::new(
            backends.capture,
            backends.permission,
            settings.preset.clone(),
        );
        Self {
            catalog: Mutex::new(catalog),
            capture: Mutex::new(capture),
            playback: PlaybackController::new(backends.playback),
            snapshot: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            settings,
        }
    }

    /// Create a manager storing clips on the local filesystem
    pub fn with_fs_storage(settings: RecorderSettings, backends: AudioBackends) -> Self {
        Self::new(settings, Arc::new(FsStorage::new()), backends)
    }

    /// Create a filesystem-backed manager from a settings file
    pub fn from_settings_file(
        path: &Path,
        backends: AudioBackends,
    ) -> Result<Self, ManagerError> {
        let settings = RecorderSettings::load(path).map_err(|e| fail("load settings", e))?;
        Ok(Self::with_fs_storage(settings, backends))
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// Clips in display order, each with its live playback state
    pub fn get_clips(&self) -> Vec<ClipRecord> {
        let active = self.playback.active();
        let mut clips = self.snapshot.read().clone();
        if let Some((id, state)) = active {
            if let Some(clip) = clips.iter_mut().find(|c| c.id == id) {
                clip.playback_state = state;
            }
        }
        clips
    }

    /// Whether a reload is in progress
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn recording_state(&self) -> CaptureState {
        self.capture.lock().await.state()
    }

    /// Rebuild the clip list from storage
    pub async fn reload(&self) -> Result<Vec<ClipRecord>, ManagerError> {
        let mut catalog = self.catalog.lock().await;
        self.reload_locked(&mut catalog).await?;
        Ok(self.get_clips())
    }

    /// Start recording, or stop and save the clip in progress.
    /// Returns the capture state after the call.
    pub async fn toggle_recording(&self) -> Result<CaptureState, ManagerError> {
        let mut catalog = self.catalog.lock().await;

        let captured = {
            let mut capture = self.capture.lock().await;
            if !capture.is_recording() {
                capture.start().await.map_err(|e| fail("start recording", e))?;
                return Ok(CaptureState::Recording);
            }
            capture.stop().await.map_err(|e| fail("stop recording", e))?
        };

        if let Some(captured) = captured {
            self.save_capture(&mut catalog, captured).await?;
        }
        Ok(CaptureState::Idle)
    }

    /// Play a clip, stopping any other clip first
    pub async fn play(&self, id: &str) -> Result<(), ManagerError> {
        let mut catalog = self.catalog.lock().await;
        let record = catalog
            .get(id)
            .cloned()
            .ok_or_else(|| fail("play", ManagerError::ClipNotFound(id.to_string())))?;

        let probed = self
            .playback
            .play(id, &record.location)
            .await
            .map_err(|e| fail("play", e))?;

        if let (None, Some(secs)) = (record.duration_secs, probed) {
            catalog.set_duration(id, secs).await;
            self.publish(&catalog);
        }
        Ok(())
    }

    /// Pause a playing clip; no-op for any other state
    pub async fn pause(&self, id: &str) -> Result<(), ManagerError> {
        let catalog = self.catalog.lock().await;
        self.require(&catalog, id, "pause")?;
        self.playback.pause(id).await.map_err(|e| fail("pause", e))
    }

    /// Resume a paused clip; no-op for any other state
    pub async fn resume(&self, id: &str) -> Result<(), ManagerError> {
        let catalog = self.catalog.lock().await;
        self.require(&catalog, id, "resume")?;
        self.playback.resume(id).await.map_err(|e| fail("resume", e))
    }

    /// Delete a clip and its file, releasing its playback handle first.
    /// Returns whether a clip was removed; unknown ids are not an error.
    pub async fn delete(&self, id: &str) -> Result<bool, ManagerError> {
        let mut catalog = self.catalog.lock().await;

        self.playback.release(id).await;
        let removed = catalog.remove(id).await.map_err(|e| fail("delete", e))?;
        self.publish(&catalog);
        self.reload_locked(&mut catalog).await?;
        Ok(removed)
    }

    /// Rename a clip.
    ///
    /// A blank name is treated as a cancelled edit: nothing changes and
    /// `Ok(None)` is returned. Otherwise returns the renamed record.
    pub async fn rename(
        &self,
        id: &str,
        new_name: &str,
    ) -> Result<Option<ClipRecord>, ManagerError> {
        if new_name.trim().is_empty() {
            crate::debug!("Rename of {} cancelled (blank name)", id);
            return Ok(None);
        }

        let mut catalog = self.catalog.lock().await;
        let renamed = catalog
            .rename(id, new_name)
            .await
            .map_err(|e| fail("rename", e))?;
        self.playback.rekey(id, &renamed.id).await;
        self.publish(&catalog);
        Ok(Some(renamed))
    }

    /// Tear everything down.
    ///
    /// A recording in progress is stopped and saved as a clip, then every
    /// playback handle is released. Failures are logged, never returned.
    pub async fn shutdown(&self) {
        crate::info!("Shutting down recording manager");
        let mut catalog = self.catalog.lock().await;

        let captured = self.capture.lock().await.stop().await;
        match captured {
            Ok(Some(captured)) => {
                // save_capture already logged any failure
                let _ = self.save_capture(&mut catalog, captured).await;
            }
            Ok(None) => {}
            Err(e) => crate::error!("Failed to stop recording during shutdown: {}", e),
        }

        self.playback.release_all().await;
    }

    async fn save_capture(
        &self,
        catalog: &mut ClipCatalog,
        captured: CapturedAudio,
    ) -> Result<(), ManagerError> {
        let prefix = &self.settings.new_clip_prefix;
        let filename = generate_filename(
            prefix,
            captured.stopped_at,
            &self.settings.preset.extension,
        );
        catalog
            .adopt(&captured.temp_path, &filename, prefix, captured.stopped_at)
            .await
            .map_err(|e| fail("save recording", e))?;
        self.reload_locked(catalog).await
    }

    async fn reload_locked(&self, catalog: &mut ClipCatalog) -> Result<(), ManagerError> {
        self.loading.store(true, Ordering::SeqCst);
        let result = catalog.reload().await.map(|_| ());
        if result.is_ok() {
            self.release_orphaned_playback(catalog).await;
            self.publish(catalog);
        }
        self.loading.store(false, Ordering::SeqCst);
        result.map_err(|e| fail("reload clips", e))
    }

    /// Stop a clip whose file vanished from storage behind our back
    async fn release_orphaned_playback(&self, catalog: &ClipCatalog) {
        let Some((id, _)) = self.playback.active() else {
            return;
        };
        if !catalog.contains(&id) {
            crate::warn!("Clip {} is no longer in storage, stopping playback", id);
            self.playback.release(&id).await;
        }
    }

    fn require(&self, catalog: &ClipCatalog, id: &str, op: &str) -> Result<(), ManagerError> {
        if catalog.contains(id) {
            Ok(())
        } else {
            Err(fail(op, ManagerError::ClipNotFound(id.to_string())))
        }
    }

    fn publish(&self, catalog: &ClipCatalog) {
        *self.snapshot.write() = catalog.records().to_vec();
    }
}

/// Log a failed operation and convert it to the manager's error type
fn fail(op: &str, err: impl Into<ManagerError>) -> ManagerError {
    let err = err.into();
    crate::error!("Failed to {}: {}", op, err);
    err
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
