//! Recorder settings.
//!
//! Settings are stored as a camelCase JSON document. Every field has a default,
//! so a missing file or a partial document yields a usable configuration.

use crate::audio::CapturePreset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name given to freshly recorded clips
pub const DEFAULT_CLIP_PREFIX: &str = "New Recording";

/// Default file name of the clip index inside the recordings directory
pub const DEFAULT_INDEX_FILE: &str = ".clips.json";

/// When clip durations are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProbePolicy {
    /// Probe every clip without a cached duration during catalog reload
    #[default]
    Eager,
    /// Leave durations unknown until the clip is first played
    OnPlay,
}

/// Errors that can occur while loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration of the recording manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderSettings {
    /// Directory holding one audio file per clip
    pub recordings_dir: PathBuf,
    /// Display name of new recordings
    pub new_clip_prefix: String,
    /// File name of the sidecar clip index
    pub index_file_name: String,
    /// When to measure clip durations
    pub duration_probe: ProbePolicy,
    /// Encoder preset for the microphone
    pub preset: CapturePreset,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            recordings_dir: default_recordings_dir(),
            new_clip_prefix: DEFAULT_CLIP_PREFIX.to_string(),
            index_file_name: DEFAULT_INDEX_FILE.to_string(),
            duration_probe: ProbePolicy::default(),
            preset: CapturePreset::high_quality(),
        }
    }
}

impl RecorderSettings {
    /// Default settings with clips stored in `dir`
    pub fn with_recordings_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            recordings_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Load settings from a JSON file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                crate::debug!("No settings file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Self = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        crate::info!("Loaded recorder settings from {:?}", path);
        Ok(settings)
    }

    /// Full path of the clip index file
    pub fn index_path(&self) -> PathBuf {
        self.recordings_dir.join(&self.index_file_name)
    }
}

/// Platform document directory + `recordings/`
pub fn default_recordings_dir() -> PathBuf {
    dirs::document_dir()
        .map(|dir| dir.join("recordings"))
        .unwrap_or_else(|| PathBuf::from(".").join("voxclip").join("recordings"))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
