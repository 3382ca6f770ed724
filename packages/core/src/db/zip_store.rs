//! ZipStorage - Archive Storage Backend
//!
//! Keeps a whole tracker in one `.zip` file, which makes it easy to hand a
//! snapshot to someone else. The archive is read into memory on open; every
//! write, delete and clear rewrites the full archive to a temporary file and
//! renames it over the original, so a crash mid-write leaves the previous
//! archive intact.
//!
//! Archive I/O is blocking and runs on the blocking thread pool.

use crate::db::error::validate_key;
use crate::db::{Storage, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Entries = BTreeMap<String, Vec<u8>>;

/// Zip-archive storage backend
#[derive(Debug)]
pub struct ZipStorage {
    archive_path: PathBuf,
    entries: Mutex<Entries>,
}

impl ZipStorage {
    /// Open an archive, or start an empty one if the file does not exist yet
    ///
    /// The file itself is only created by the first mutation.
    pub async fn open(archive_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let archive_path = archive_path.into();
        let path = archive_path.clone();
        let entries = tokio::task::spawn_blocking(move || load_archive(&path))
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))??;

        tracing::info!(
            "Opened zip storage at {} ({} entries)",
            archive_path.display(),
            entries.len()
        );
        Ok(Self {
            archive_path,
            entries: Mutex::new(entries),
        })
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Apply `change` to a copy of the entries, persist it, then commit
    ///
    /// The in-memory view only changes once the archive is safely on disk.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Entries) -> T,
    ) -> Result<T, StorageError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        let outcome = change(&mut next);

        let path = self.archive_path.clone();
        let snapshot = next.clone();
        tokio::task::spawn_blocking(move || write_archive(&path, &snapshot))
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))??;

        *entries = next;
        Ok(outcome)
    }
}

fn load_archive(path: &Path) -> Result<Entries, StorageError> {
    let mut entries = Entries::new();
    if !path.exists() {
        return Ok(entries);
    }

    let file = File::open(path).map_err(|e| StorageError::io(path.to_string_lossy(), e))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| StorageError::archive(path.to_path_buf(), e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| StorageError::archive(path.to_path_buf(), e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| StorageError::io(name.clone(), e))?;
        entries.insert(name, data);
    }
    Ok(entries)
}

fn write_archive(path: &Path, entries: &Entries) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::io(parent.to_string_lossy(), e))?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let file =
        File::create(&tmp_path).map_err(|e| StorageError::io(tmp_path.to_string_lossy(), e))?;
    let mut writer = zip::ZipWriter::new(BufWriter::new(file));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, data) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| StorageError::archive(path.to_path_buf(), e.to_string()))?;
        writer
            .write_all(data)
            .map_err(|e| StorageError::io(name.clone(), e))?;
    }

    let mut buffered = writer
        .finish()
        .map_err(|e| StorageError::archive(path.to_path_buf(), e.to_string()))?;
    buffered
        .flush()
        .map_err(|e| StorageError::io(tmp_path.to_string_lossy(), e))?;
    drop(buffered);

    std::fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path.to_string_lossy(), e))
}

#[async_trait]
impl Storage for ZipStorage {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        let key = key.to_string();
        let data = data.to_vec();
        self.mutate(move |entries| {
            entries.insert(key, data);
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        if !self.entries.lock().await.contains_key(key) {
            return Ok(false);
        }
        self.mutate(|entries| entries.remove(key).is_some()).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.mutate(|entries| entries.clear()).await?;
        tracing::debug!("Cleared zip storage at {}", self.archive_path.display());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "zip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_archive_opens_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.zip");
        let storage = ZipStorage::open(&path).await.unwrap();

        assert!(!storage.exists("a").await.unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.zip");

        {
            let storage = ZipStorage::open(&path).await.unwrap();
            storage
                .write(".issues/data/bug/Bug-1/node.json", b"{\"a\":1}")
                .await
                .unwrap();
            storage.write("_index.json", b"{}").await.unwrap();
        }

        let reopened = ZipStorage::open(&path).await.unwrap();
        assert_eq!(
            reopened
                .read(".issues/data/bug/Bug-1/node.json")
                .await
                .unwrap(),
            Some(b"{\"a\":1}".to_vec())
        );
        assert!(reopened.exists("_index.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.zip");

        let storage = ZipStorage::open(&path).await.unwrap();
        storage.write("a", b"1").await.unwrap();
        storage.write("b", b"2").await.unwrap();
        assert!(storage.delete("a").await.unwrap());
        assert!(!storage.delete("a").await.unwrap());

        let reopened = ZipStorage::open(&path).await.unwrap();
        assert!(!reopened.exists("a").await.unwrap());
        assert!(reopened.exists("b").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_leaves_empty_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.zip");

        let storage = ZipStorage::open(&path).await.unwrap();
        storage.write("a", b"1").await.unwrap();
        storage.clear().await.unwrap();

        let reopened = ZipStorage::open(&path).await.unwrap();
        assert!(!reopened.exists("a").await.unwrap());
    }
}
