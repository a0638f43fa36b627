//! Storage layer for recorded clips.
//!
//! This module wraps the filesystem primitives the clip catalog relies on
//! (directory listing, move, delete, stat) behind [`StorageBackend`], and the
//! sidecar [`ClipIndex`] that remembers display names, creation times and
//! probed durations independently of file names.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::storage::{FsStorage, StorageBackend};
//!
//! let storage = FsStorage::new();
//! storage.ensure_dir(&recordings_dir).await?;
//! let names = storage.list_entries(&recordings_dir).await?;
//! ```

mod fs;
mod index;
mod traits;

pub use fs::FsStorage;
pub use index::{ClipIndex, IndexEntry};
pub use traits::{FileStat, StorageBackend, StorageError};
