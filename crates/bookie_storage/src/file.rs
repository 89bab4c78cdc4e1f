//! Sized file handle, the base every buffering layer wraps.

use crate::backend::FileResource;
use crate::error::StorageResult;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// A thin handle over one file resource that can report its length.
///
/// The length is never cached. Bytes still pending in a write buffer are
/// not part of it; use the write side's positions for those.
///
/// The handle does not close the resource. Dropping it drops the resource,
/// and [`SizedFile::into_inner`] hands it back to the owner.
#[derive(Debug)]
pub struct SizedFile<R> {
    inner: R,
}

impl<R: FileResource> SizedFile<R> {
    /// Wraps an already open resource.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Queries the current length of the resource.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the metadata query fails.
    pub fn size(&self) -> StorageResult<u64> {
        Ok(self.inner.size()?)
    }

    /// Returns a reference to the wrapped resource.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the handle, returning the resource.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(any(unix, windows))]
impl SizedFile<File> {
    /// Opens or creates a file at the given path.
    ///
    /// Existing contents are kept, so a reopened ledger file continues
    /// where it stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Ok(Self::new(file))
    }

    /// Opens or creates a file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.log");

        let file = SizedFile::open(&path).unwrap();
        assert_eq!(file.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn size_is_requeried() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.log");

        let file = SizedFile::open(&path).unwrap();
        file.get_ref().append(b"abc").unwrap();
        assert_eq!(file.size().unwrap(), 3);
        file.get_ref().append(b"de").unwrap();
        assert_eq!(file.size().unwrap(), 5);
    }

    #[test]
    fn reopen_keeps_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.log");

        {
            let file = SizedFile::open(&path).unwrap();
            file.get_ref().append(b"persistent").unwrap();
            file.get_ref().sync().unwrap();
        }

        let file = SizedFile::open(&path).unwrap();
        assert_eq!(file.size().unwrap(), 10);
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledgers").join("0001").join("entries.log");

        let file = SizedFile::open_with_create_dirs(&path).unwrap();
        assert_eq!(file.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn into_inner_returns_resource() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.log");

        let file = SizedFile::open(&path).unwrap();
        let raw: File = file.into_inner();
        assert_eq!(raw.metadata().unwrap().len(), 0);
    }
}
