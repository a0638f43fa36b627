//! Recording lifecycle and playback state manager for a voice memo app.
//!
//! The embedding application supplies the platform pieces (microphone,
//! decoder, permission prompt) through the traits in [`audio`] and drives
//! everything through [`RecordingManager`]. Clips live as plain audio files in
//! one directory next to a small JSON index.

pub mod audio;
pub mod catalog;
pub mod manager;
pub mod playback;
pub mod recording;
pub mod storage;
pub mod util;

#[cfg(test)]
mod test_support;

// Re-export log macros for use throughout the crate
pub use log::{debug, error, info, trace, warn};

pub use catalog::ClipRecord;
pub use manager::{AudioBackends, ManagerError, RecordingManager};
pub use playback::PlaybackState;
pub use recording::CaptureState;
pub use util::RecorderSettings;
