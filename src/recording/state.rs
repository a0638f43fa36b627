// Capture session state management

use crate::audio::{CaptureDevice, CaptureHandle, CapturePreset, DeviceError, PermissionGate};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Capture state representing the current state of the recording process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CaptureState {
    /// Not recording, ready to start
    #[default]
    Idle,
    /// Microphone open, audio being written to a temporary file
    Recording,
}

/// Errors that can occur while starting or stopping a capture
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("A recording is already in progress")]
    AlreadyRecording,
    #[error("Microphone permission denied")]
    PermissionDenied,
    #[error("Failed to open microphone: {0}")]
    Device(#[source] DeviceError),
    #[error("Failed to finalize recording: {0}")]
    Finalize(#[source] DeviceError),
}

/// A finished capture waiting to be moved into the clip store
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedAudio {
    /// Temporary file written by the capture device
    pub temp_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

/// The in-flight recording (present only while Recording)
struct ActiveCapture {
    handle: Box<dyn CaptureHandle>,
    started_at: DateTime<Utc>,
}

/// Owner of the single capture session.
///
/// The controller never touches the clip store; the finished temporary file
/// is handed back to the caller.
pub struct CaptureController {
    device: Arc<dyn CaptureDevice>,
    permission: Arc<dyn PermissionGate>,
    preset: CapturePreset,
    active: Option<ActiveCapture>,
}

impl CaptureController {
    pub fn new(
        device: Arc<dyn CaptureDevice>,
        permission: Arc<dyn PermissionGate>,
        preset: CapturePreset,
    ) -> Self {
        Self {
            device,
            permission,
            preset,
            active: None,
        }
    }

    /// Get the current capture state
    pub fn state(&self) -> CaptureState {
        if self.active.is_some() {
            CaptureState::Recording
        } else {
            CaptureState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Open the microphone and transition to Recording.
    ///
    /// # Errors
    /// - `AlreadyRecording` if a session is in flight (the session is untouched)
    /// - `PermissionDenied` if microphone access is refused
    /// - `Device` if the microphone cannot be opened
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if self.active.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        if !self.permission.request_audio_permission().await {
            crate::warn!("Microphone permission denied");
            return Err(CaptureError::PermissionDenied);
        }

        let handle = self
            .device
            .open_for_capture(&self.preset)
            .await
            .map_err(CaptureError::Device)?;

        self.active = Some(ActiveCapture {
            handle,
            started_at: Utc::now(),
        });
        crate::info!(
            "Recording started ({} Hz, {} ch, {})",
            self.preset.sample_rate,
            self.preset.channels,
            self.preset.extension
        );
        Ok(())
    }

    /// Finalize the session and return the captured audio.
    ///
    /// Returns `Ok(None)` when nothing is being recorded. The controller is
    /// Idle afterwards even if finalizing fails.
    pub async fn stop(&mut self) -> Result<Option<CapturedAudio>, CaptureError> {
        let Some(mut active) = self.active.take() else {
            crate::debug!("Stop requested while idle");
            return Ok(None);
        };

        let temp_path = active.handle.stop().await.map_err(|e| {
            crate::error!("Failed to finalize recording: {}", e);
            CaptureError::Finalize(e)
        })?;

        let stopped_at = Utc::now();
        crate::info!(
            "Recording stopped after {:.1}s: {:?}",
            (stopped_at - active.started_at).num_milliseconds() as f64 / 1000.0,
            temp_path
        );
        Ok(Some(CapturedAudio {
            temp_path,
            started_at: active.started_at,
            stopped_at,
        }))
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
