//! Durable local storage for the post record
//!
//! Storage is a single named record. Backends only move strings; encoding and
//! the validating decode live in [`crate::store`] and [`crate::decode`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Name of the record holding the current post.
pub const RECORD_NAME: &str = "fake-tweet-storage";

pub trait PostStorage: Send + Sync {
    /// Read the record, `Ok(None)` when nothing was stored yet.
    fn read(&self) -> Result<Option<String>>;
    /// Replace the record.
    fn write(&self, contents: &str) -> Result<()>;
}

/// Keeps the record as `<dir>/fake-tweet-storage.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", RECORD_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PostStorage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::Storage(format!("{}: {}", parent.display(), e)))?;
            }
        }
        // Write beside the target and rename so a crash never leaves half a record
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| Error::Storage(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

/// In-memory record, used in tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing record, as if written by an earlier session.
    pub fn with_record(contents: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(contents.into())),
            writes: Mutex::new(0),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.record.lock().ok().and_then(|g| g.clone())
    }

    /// Number of writes seen so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|g| *g).unwrap_or(0)
    }
}

impl PostStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        let g = self
            .record
            .lock()
            .map_err(|_| Error::Storage("memory record lock poisoned".into()))?;
        Ok(g.clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut g = self
            .record
            .lock()
            .map_err(|_| Error::Storage("memory record lock poisoned".into()))?;
        *g = Some(contents.to_string());
        if let Ok(mut w) = self.writes.lock() {
            *w += 1;
        }
        Ok(())
    }
}

impl<T: PostStorage + ?Sized> PostStorage for Box<T> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<()> {
        (**self).write(contents)
    }
}

impl<T: PostStorage + ?Sized> PostStorage for std::sync::Arc<T> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<()> {
        (**self).write(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let s = MemoryStorage::new();
        assert!(s.read().unwrap().is_none());
        s.write("{}").unwrap();
        assert_eq!(s.read().unwrap().as_deref(), Some("{}"));
        assert_eq!(s.write_count(), 1);
    }

    #[test]
    fn file_storage_creates_parent_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path().join("nested"));
        assert!(storage.read().unwrap().is_none());
        storage.write("{\"a\":1}").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(storage.path().ends_with("fake-tweet-storage.json"));
    }
}
