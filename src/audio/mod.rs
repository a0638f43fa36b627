// Audio device contracts for microphone capture and clip playback

mod device;
pub use device::{
    CaptureDevice, CaptureHandle, CapturePreset, CompletionCallback, DeviceError, PermissionGate,
    PlaybackDevice, PlaybackHandle,
};

#[cfg(test)]
#[path = "device_test.rs"]
mod tests;
