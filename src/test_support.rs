// Mock audio devices shared by the unit tests

use crate::audio::{
    CaptureDevice, CaptureHandle, CapturePreset, CompletionCallback, DeviceError, PermissionGate,
    PlaybackDevice, PlaybackHandle,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Permission
// =============================================================================

pub struct MockPermission {
    granted: AtomicBool,
    pub requests: AtomicUsize,
}

impl MockPermission {
    pub fn granted() -> Arc<Self> {
        Arc::new(Self {
            granted: AtomicBool::new(true),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            granted: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

#[async_trait]
impl PermissionGate for MockPermission {
    async fn request_audio_permission(&self) -> bool {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.granted.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Capture
// =============================================================================

/// Capture device that writes a small file into `temp_dir` when stopped
pub struct MockCaptureDevice {
    temp_dir: PathBuf,
    pub opened: AtomicUsize,
    pub stopped: Arc<AtomicUsize>,
    fail_open: AtomicBool,
    fail_stop: Arc<AtomicBool>,
    last_preset: Mutex<Option<CapturePreset>>,
}

impl MockCaptureDevice {
    pub fn new(temp_dir: &Path) -> Arc<Self> {
        std::fs::create_dir_all(temp_dir).unwrap();
        Arc::new(Self {
            temp_dir: temp_dir.to_path_buf(),
            opened: AtomicUsize::new(0),
            stopped: Arc::new(AtomicUsize::new(0)),
            fail_open: AtomicBool::new(false),
            fail_stop: Arc::new(AtomicBool::new(false)),
            last_preset: Mutex::new(None),
        })
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    pub fn last_preset(&self) -> Option<CapturePreset> {
        self.last_preset.lock().clone()
    }
}

#[async_trait]
impl CaptureDevice for MockCaptureDevice {
    async fn open_for_capture(
        &self,
        preset: &CapturePreset,
    ) -> Result<Box<dyn CaptureHandle>, DeviceError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(DeviceError::Unavailable("microphone busy".to_string()));
        }
        let serial = self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_preset.lock() = Some(preset.clone());
        Ok(Box::new(MockCaptureHandle {
            stopped: Arc::clone(&self.stopped),
            fail_stop: Arc::clone(&self.fail_stop),
            path: self
                .temp_dir
                .join(format!("capture-{}{}", serial, preset.extension)),
        }))
    }
}

struct MockCaptureHandle {
    stopped: Arc<AtomicUsize>,
    fail_stop: Arc<AtomicBool>,
    path: PathBuf,
}

#[async_trait]
impl CaptureHandle for MockCaptureHandle {
    async fn stop(&mut self) -> Result<PathBuf, DeviceError> {
        self.stopped.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(DeviceError::Failed("encoder error".to_string()));
        }
        std::fs::write(&self.path, b"captured audio")
            .map_err(|e| DeviceError::Failed(e.to_string()))?;
        Ok(self.path.clone())
    }
}

// =============================================================================
// Playback
// =============================================================================

/// Observable state of one opened playback handle
pub struct HandleProbe {
    pub serial: usize,
    pub location: PathBuf,
    pub play_calls: AtomicUsize,
    pub pause_calls: AtomicUsize,
    pub release_calls: AtomicUsize,
    pub seeks: Mutex<Vec<Duration>>,
    callback: Mutex<Option<CompletionCallback>>,
    fail_play: AtomicBool,
    fail_pause: AtomicBool,
}

impl HandleProbe {
    pub fn is_released(&self) -> bool {
        self.release_calls.load(Ordering::SeqCst) > 0
    }

    pub fn plays(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Simulate the decoder reaching the end of the clip.
    /// Returns false if no callback was registered.
    pub fn finish(&self) -> bool {
        let callback = self.callback.lock().take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn fail_pause(&self, fail: bool) {
        self.fail_pause.store(fail, Ordering::SeqCst);
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }
}

pub struct MockPlaybackDevice {
    handles: Mutex<Vec<Arc<HandleProbe>>>,
    durations: Mutex<HashMap<PathBuf, Duration>>,
    fail_open: AtomicBool,
    fail_play: AtomicBool,
    fail_probe: AtomicBool,
}

impl MockPlaybackDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            handles: Mutex::new(Vec::new()),
            durations: Mutex::new(HashMap::new()),
            fail_open: AtomicBool::new(false),
            fail_play: AtomicBool::new(false),
            fail_probe: AtomicBool::new(false),
        })
    }

    pub fn set_duration(&self, location: &Path, duration: Duration) {
        self.durations.lock().insert(location.to_path_buf(), duration);
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Make `play` fail on handles opened from now on
    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn fail_probe(&self, fail: bool) {
        self.fail_probe.store(fail, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn handles(&self) -> Vec<Arc<HandleProbe>> {
        self.handles.lock().clone()
    }

    pub fn last_handle(&self) -> Arc<HandleProbe> {
        self.handles.lock().last().cloned().expect("no handle opened")
    }

    /// Handles currently loaded (opened and not released)
    pub fn live_handles(&self) -> usize {
        self.handles.lock().iter().filter(|h| !h.is_released()).count()
    }
}

#[async_trait]
impl PlaybackDevice for MockPlaybackDevice {
    async fn open_for_playback(
        &self,
        location: &Path,
    ) -> Result<Box<dyn PlaybackHandle>, DeviceError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(DeviceError::Unavailable("decoder unavailable".to_string()));
        }
        let duration = self
            .durations
            .lock()
            .get(location)
            .copied()
            .unwrap_or(Duration::from_secs(3));

        let mut handles = self.handles.lock();
        let probe = Arc::new(HandleProbe {
            serial: handles.len(),
            location: location.to_path_buf(),
            play_calls: AtomicUsize::new(0),
            pause_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
            seeks: Mutex::new(Vec::new()),
            callback: Mutex::new(None),
            fail_play: AtomicBool::new(self.fail_play.load(Ordering::SeqCst)),
            fail_pause: AtomicBool::new(false),
        });
        handles.push(Arc::clone(&probe));

        Ok(Box::new(MockPlaybackHandle {
            probe,
            duration,
            fail_probe: self.fail_probe.load(Ordering::SeqCst),
        }))
    }
}

struct MockPlaybackHandle {
    probe: Arc<HandleProbe>,
    duration: Duration,
    fail_probe: bool,
}

#[async_trait]
impl PlaybackHandle for MockPlaybackHandle {
    async fn play(&mut self) -> Result<(), DeviceError> {
        if self.probe.fail_play.load(Ordering::SeqCst) {
            return Err(DeviceError::Failed("cannot start playback".to_string()));
        }
        self.probe.play_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), DeviceError> {
        if self.probe.fail_pause.load(Ordering::SeqCst) {
            return Err(DeviceError::Failed("cannot pause".to_string()));
        }
        self.probe.pause_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<(), DeviceError> {
        self.probe.seeks.lock().push(position);
        Ok(())
    }

    async fn probe_duration(&mut self) -> Result<Duration, DeviceError> {
        if self.fail_probe {
            return Err(DeviceError::Failed("unreadable header".to_string()));
        }
        Ok(self.duration)
    }

    fn on_complete(&mut self, callback: CompletionCallback) {
        *self.probe.callback.lock() = Some(callback);
    }

    async fn release(&mut self) -> Result<(), DeviceError> {
        self.probe.release_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Yield to the runtime until `condition` holds, failing after one second
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 1s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
