// Playback controller - owns the single active decoder handle
//
// Exclusivity is structural: the controller holds one optional slot, so a
// second clip can only start after the first one has been taken out and
// released. End-of-clip callbacks arrive from device threads and are funnelled
// back into the runtime as tasks that re-acquire the slot lock.

use super::state::PlaybackState;
use crate::audio::{CompletionCallback, DeviceError, PlaybackDevice, PlaybackHandle};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle as RuntimeHandle;
use tokio::sync::Mutex;

/// Errors raised by playback operations.
///
/// Whenever one of these is returned the clip is back to `Idle` and its
/// handle has been released.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Failed to load clip {id}: {source}")]
    Load {
        id: String,
        #[source]
        source: DeviceError,
    },
    #[error("Failed to start playback of {id}: {source}")]
    Play {
        id: String,
        #[source]
        source: DeviceError,
    },
    #[error("Failed to pause {id}: {source}")]
    Pause {
        id: String,
        #[source]
        source: DeviceError,
    },
    #[error("Failed to resume {id}: {source}")]
    Resume {
        id: String,
        #[source]
        source: DeviceError,
    },
    #[error("Playback requires a running tokio runtime")]
    Runtime,
}

/// The clip currently holding the decoder
struct ActivePlayback {
    id: String,
    state: PlaybackState,
    handle: Box<dyn PlaybackHandle>,
    /// Distinguishes this load from earlier loads of the same clip
    generation: u64,
}

type Slot = Mutex<Option<ActivePlayback>>;

/// Lock-free view of the slot for synchronous readers
type StatusMirror = parking_lot::Mutex<Option<(String, PlaybackState)>>;

pub struct PlaybackController {
    device: Arc<dyn PlaybackDevice>,
    slot: Arc<Slot>,
    status: Arc<StatusMirror>,
    generations: AtomicU64,
}

impl PlaybackController {
    pub fn new(device: Arc<dyn PlaybackDevice>) -> Self {
        Self {
            device,
            slot: Arc::new(Mutex::new(None)),
            status: Arc::new(parking_lot::Mutex::new(None)),
            generations: AtomicU64::new(0),
        }
    }

    /// Current state of `id` as last published
    #[cfg(test)]
    pub fn state_of(&self, id: &str) -> PlaybackState {
        match &*self.status.lock() {
            Some((active, state)) if active == id => *state,
            _ => PlaybackState::Idle,
        }
    }

    /// The clip holding the decoder, if any
    pub fn active(&self) -> Option<(String, PlaybackState)> {
        self.status.lock().clone()
    }

    /// Play `id`, stopping whatever else is active first.
    ///
    /// A paused clip continues from its position on the same handle; a clip
    /// that is already playing is left alone. Otherwise the clip is loaded
    /// from `location` and started from the beginning.
    ///
    /// Returns the measured duration when a new handle was loaded.
    pub async fn play(&self, id: &str, location: &Path) -> Result<Option<f64>, PlaybackError> {
        let runtime = RuntimeHandle::try_current().map_err(|_| PlaybackError::Runtime)?;
        let mut slot = self.slot.lock().await;

        if let Some(active) = slot.as_mut().filter(|a| a.id == id) {
            match active.state {
                PlaybackState::Playing => {
                    crate::debug!("Clip {} is already playing", id);
                    return Ok(None);
                }
                PlaybackState::Paused => {
                    return self
                        .continue_paused(&mut slot, id)
                        .await
                        .map(|()| None)
                        .map_err(|source| PlaybackError::Play {
                            id: id.to_string(),
                            source,
                        });
                }
                PlaybackState::Idle => {}
            }
        }

        if let Some(previous) = slot.take() {
            crate::debug!("Stopping {} before playing {}", previous.id, id);
            release_active(previous).await;
            publish(&self.status, &slot);
        }

        let mut handle = self
            .device
            .open_for_playback(location)
            .await
            .map_err(|source| PlaybackError::Load {
                id: id.to_string(),
                source,
            })?;

        let duration = match handle.probe_duration().await {
            Ok(duration) => Some(duration.as_secs_f64()),
            Err(e) => {
                crate::warn!("Failed to probe duration of {}: {}", id, e);
                None
            }
        };

        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        handle.on_complete(completion_callback(
            Arc::downgrade(&self.slot),
            Arc::downgrade(&self.status),
            generation,
            runtime,
        ));

        if let Err(source) = handle.play().await {
            release_handle(handle, id).await;
            return Err(PlaybackError::Play {
                id: id.to_string(),
                source,
            });
        }

        *slot = Some(ActivePlayback {
            id: id.to_string(),
            state: PlaybackState::Playing,
            handle,
            generation,
        });
        publish(&self.status, &slot);
        crate::info!("Playing clip {}", id);
        Ok(duration)
    }

    /// Pause `id` if it is playing; no-op otherwise
    pub async fn pause(&self, id: &str) -> Result<(), PlaybackError> {
        let mut slot = self.slot.lock().await;
        let Some(active) = slot
            .as_mut()
            .filter(|a| a.id == id && a.state == PlaybackState::Playing)
        else {
            crate::debug!("Pause ignored: {} is not playing", id);
            return Ok(());
        };

        match active.handle.pause().await {
            Ok(()) => {
                active.state = PlaybackState::Paused;
                publish(&self.status, &slot);
                crate::debug!("Paused clip {}", id);
                Ok(())
            }
            Err(source) => {
                self.drop_active(&mut slot).await;
                Err(PlaybackError::Pause {
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    /// Resume `id` if it is paused; no-op otherwise
    pub async fn resume(&self, id: &str) -> Result<(), PlaybackError> {
        let mut slot = self.slot.lock().await;
        if !slot
            .as_ref()
            .is_some_and(|a| a.id == id && a.state == PlaybackState::Paused)
        {
            crate::debug!("Resume ignored: {} is not paused", id);
            return Ok(());
        }

        self.continue_paused(&mut slot, id)
            .await
            .map_err(|source| PlaybackError::Resume {
                id: id.to_string(),
                source,
            })
    }

    /// Release the handle of `id` regardless of its state.
    /// Returns whether a handle was released.
    pub async fn release(&self, id: &str) -> bool {
        let mut slot = self.slot.lock().await;
        if !slot.as_ref().is_some_and(|a| a.id == id) {
            return false;
        }
        self.drop_active(&mut slot).await;
        true
    }

    /// Release whatever handle is held
    pub async fn release_all(&self) {
        let mut slot = self.slot.lock().await;
        if slot.is_some() {
            self.drop_active(&mut slot).await;
        }
    }

    /// Follow a clip through a rename so its session stays attached
    pub async fn rekey(&self, old_id: &str, new_id: &str) {
        let mut slot = self.slot.lock().await;
        if let Some(active) = slot.as_mut().filter(|a| a.id == old_id) {
            active.id = new_id.to_string();
            publish(&self.status, &slot);
        }
    }

    /// Continue the paused handle in `slot`, dropping it on failure
    async fn continue_paused(
        &self,
        slot: &mut Option<ActivePlayback>,
        id: &str,
    ) -> Result<(), DeviceError> {
        let Some(active) = slot.as_mut() else {
            return Ok(());
        };
        match active.handle.play().await {
            Ok(()) => {
                active.state = PlaybackState::Playing;
                publish(&self.status, slot);
                crate::debug!("Resumed clip {}", id);
                Ok(())
            }
            Err(e) => {
                self.drop_active(slot).await;
                Err(e)
            }
        }
    }

    async fn drop_active(&self, slot: &mut Option<ActivePlayback>) {
        if let Some(active) = slot.take() {
            release_active(active).await;
        }
        publish(&self.status, slot);
    }
}

fn publish(status: &StatusMirror, slot: &Option<ActivePlayback>) {
    *status.lock() = slot.as_ref().map(|a| (a.id.clone(), a.state));
}

async fn release_active(active: ActivePlayback) {
    crate::debug!("Releasing playback handle of {}", active.id);
    release_handle(active.handle, &active.id).await;
}

async fn release_handle(mut handle: Box<dyn PlaybackHandle>, id: &str) {
    if let Err(e) = handle.release().await {
        crate::warn!("Failed to release playback handle of {}: {}", id, e);
    }
}

/// Build the end-of-clip callback for the load identified by `generation`.
///
/// The callback only holds weak references, so a controller dropped before
/// the clip ends is not kept alive by its decoder.
fn completion_callback(
    slot: Weak<Slot>,
    status: Weak<StatusMirror>,
    generation: u64,
    runtime: RuntimeHandle,
) -> CompletionCallback {
    Box::new(move || {
        runtime.spawn(async move {
            let (Some(slot), Some(status)) = (slot.upgrade(), status.upgrade()) else {
                return;
            };
            finish_playback(&slot, &status, generation).await;
        });
    })
}

async fn finish_playback(slot: &Slot, status: &StatusMirror, generation: u64) {
    let mut slot = slot.lock().await;
    if !slot.as_ref().is_some_and(|a| a.generation == generation) {
        crate::debug!("Ignoring completion of superseded playback #{}", generation);
        return;
    }
    let Some(mut active) = slot.take() else {
        return;
    };

    if let Err(e) = active.handle.seek(Duration::ZERO).await {
        crate::warn!("Failed to rewind {}: {}", active.id, e);
    }
    crate::info!("Clip {} finished playing", active.id);
    release_active(active).await;
    publish(status, &slot);
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
