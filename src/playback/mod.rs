// Playback module - exclusive playback of stored clips

mod controller;
mod state;

pub use controller::{PlaybackController, PlaybackError};
pub use state::PlaybackState;
