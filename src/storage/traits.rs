//! Storage backend trait for clip files.
//!
//! The catalog talks to the filesystem only through this trait, allowing
//! the clip store to be decoupled from the specific storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The file or directory does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The destination of a move already exists
    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// Any other I/O failure (permissions, cross-device moves, full disk)
    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Map an I/O error, keeping "not found" as its own variant.
    pub fn from_io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_path_buf()),
            _ => StorageError::Io {
                op,
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result of a stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub exists: bool,
    /// Last modification time, if the file exists and the platform reports it
    pub modified: Option<DateTime<Utc>>,
}

impl FileStat {
    pub fn missing() -> Self {
        Self {
            exists: false,
            modified: None,
        }
    }
}

/// Backend trait for clip storage operations.
///
/// Implementations provide the filesystem primitives the catalog needs.
/// The primary implementation is [`FsStorage`](super::FsStorage).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Create the directory and its parents if absent.
    ///
    /// Returns `true` if the directory had to be created.
    async fn ensure_dir(&self, path: &Path) -> Result<bool, StorageError>;

    /// List the names of the regular files in a directory.
    async fn list_entries(&self, path: &Path) -> Result<Vec<String>, StorageError>;

    /// Move a file. Either fully moved or untouched; never overwrites `to`.
    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

    /// Delete a file.
    async fn remove(&self, path: &Path) -> Result<(), StorageError>;

    /// Query existence and modification time.
    async fn stat(&self, path: &Path) -> Result<FileStat, StorageError>;

    /// Read a whole file, `None` if it does not exist.
    async fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace a file's contents atomically (temp file + rename).
    async fn write_file_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError>;
}

#[cfg(test)]
#[path = "traits_test.rs"]
mod tests;
