//! Filesystem storage backend on top of `tokio::fs`.

use super::traits::{FileStat, StorageBackend, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::fs;

/// Production storage backend using the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageBackend for FsStorage {
    async fn ensure_dir(&self, path: &Path) -> Result<bool, StorageError> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => return Ok(false),
            Ok(_) => {
                return Err(StorageError::AlreadyExists(path.to_path_buf()));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::from_io("inspect", path, e)),
        }

        fs::create_dir_all(path)
            .await
            .map_err(|e| StorageError::from_io("create directory", path, e))?;
        crate::debug!("Created directory {}", path.display());
        Ok(true)
    }

    async fn list_entries(&self, path: &Path) -> Result<Vec<String>, StorageError> {
        let mut dir = fs::read_dir(path)
            .await
            .map_err(|e| StorageError::from_io("list", path, e))?;

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io("list", path, e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => crate::debug!("Skipping non UTF-8 file name {:?}", raw),
            }
        }
        Ok(names)
    }

    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        if fs::try_exists(to)
            .await
            .map_err(|e| StorageError::from_io("inspect", to, e))?
        {
            return Err(StorageError::AlreadyExists(to.to_path_buf()));
        }

        fs::rename(from, to)
            .await
            .map_err(|e| StorageError::from_io("move", from, e))
    }

    async fn remove(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path)
            .await
            .map_err(|e| StorageError::from_io("remove", path, e))
    }

    async fn stat(&self, path: &Path) -> Result<FileStat, StorageError> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(FileStat {
                exists: true,
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileStat::missing()),
            Err(e) => Err(StorageError::from_io("stat", path, e)),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_io("read", path, e)),
        }
    }

    async fn write_file_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::from_io("create directory", parent, e))?;
        }

        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, contents)
            .await
            .map_err(|e| StorageError::from_io("write", &temp_path, e))?;
        {
            let file = fs::File::open(&temp_path)
                .await
                .map_err(|e| StorageError::from_io("open", &temp_path, e))?;
            file.sync_all()
                .await
                .map_err(|e| StorageError::from_io("sync", &temp_path, e))?;
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::from_io("replace", path, e));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fs_test.rs"]
mod tests;
