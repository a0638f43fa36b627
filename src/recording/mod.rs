// Recording module for managing the capture session

mod state;
pub use state::{CaptureController, CaptureError, CaptureState, CapturedAudio};
