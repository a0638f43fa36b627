// Per-clip playback state

use serde::{Deserialize, Serialize};

/// Playback state of a single clip.
///
/// At most one clip in the catalog is ever in a state other than `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Not loaded
    #[default]
    Idle,
    /// Loaded and producing audio
    Playing,
    /// Loaded, position retained
    Paused,
}

impl PlaybackState {
    /// Whether a decoder handle is held for the clip
    pub fn is_active(self) -> bool {
        self != PlaybackState::Idle
    }
}
