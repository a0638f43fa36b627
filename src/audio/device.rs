// Audio device contracts consumed by the capture and playback controllers
//
// The platform layer (AVFoundation, Android MediaPlayer, cpal, ...) implements
// these traits; the crate only drives them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors reported by an audio device implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The device could not be opened (busy, missing, not permitted)
    #[error("Audio device unavailable: {0}")]
    Unavailable(String),
    /// An operation on an open device failed
    #[error("Audio device operation failed: {0}")]
    Failed(String),
}

/// Encoder settings used when opening the microphone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePreset {
    /// File extension of the produced recording, including the leading dot
    pub extension: String,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Target encoder bit rate in bits per second
    pub bit_rate: u32,
}

impl CapturePreset {
    /// The fixed high-quality preset used for every recording (AAC in MPEG-4)
    pub fn high_quality() -> Self {
        Self {
            extension: ".m4a".to_string(),
            sample_rate: 44_100,
            channels: 2,
            bit_rate: 128_000,
        }
    }
}

impl Default for CapturePreset {
    fn default() -> Self {
        Self::high_quality()
    }
}

/// Grants access to the microphone
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Ask the platform for microphone access, prompting the user if needed
    async fn request_audio_permission(&self) -> bool;
}

/// Opens capture sessions on the microphone
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Open the microphone and start recording with the given preset
    async fn open_for_capture(
        &self,
        preset: &CapturePreset,
    ) -> Result<Box<dyn CaptureHandle>, DeviceError>;
}

/// A live capture session owned by the capture controller
#[async_trait]
pub trait CaptureHandle: Send {
    /// Finalize the recording and return the temporary file holding it.
    ///
    /// The caller is responsible for moving the file into permanent storage.
    async fn stop(&mut self) -> Result<PathBuf, DeviceError>;
}

/// Invoked by a playback handle when it reaches the end of the clip.
/// May be called from any thread.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opens decoders for stored clips
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// Load the clip at `location`, positioned at the start
    async fn open_for_playback(&self, location: &Path)
        -> Result<Box<dyn PlaybackHandle>, DeviceError>;
}

/// A loaded decoder instance
#[async_trait]
pub trait PlaybackHandle: Send {
    /// Start or continue playback from the current position
    async fn play(&mut self) -> Result<(), DeviceError>;

    /// Pause playback, keeping the current position
    async fn pause(&mut self) -> Result<(), DeviceError>;

    /// Move the playback position
    async fn seek(&mut self, position: Duration) -> Result<(), DeviceError>;

    /// Measure the total length of the loaded clip
    async fn probe_duration(&mut self) -> Result<Duration, DeviceError>;

    /// Register the end-of-clip callback, replacing any previous one
    fn on_complete(&mut self, callback: CompletionCallback);

    /// Stop playback and free the decoder
    async fn release(&mut self) -> Result<(), DeviceError>;
}
