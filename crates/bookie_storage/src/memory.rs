//! In-memory file resource for testing.

use crate::backend::FileResource;
use parking_lot::RwLock;
use std::io;

/// An in-memory file resource.
///
/// This resource keeps all bytes in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral ledgers that don't need persistence
///
/// # Thread Safety
///
/// This resource is thread-safe and can be shared across threads,
/// typically behind an [`std::sync::Arc`].
///
/// # Example
///
/// ```rust
/// use bookie_storage::{FileResource, InMemoryFile};
///
/// let file = InMemoryFile::new();
/// file.append(b"test data").unwrap();
/// assert_eq!(file.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryFile {
    data: RwLock<Vec<u8>>,
}

impl InMemoryFile {
    /// Creates a new empty in-memory file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory file with pre-existing data.
    ///
    /// Useful for testing reopen scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all bytes in the file.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Shrinks the file to `len` bytes, behind the back of any buffer.
    ///
    /// Does nothing if the file is already shorter.
    pub fn truncate(&self, len: u64) {
        let mut data = self.data.write();
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        data.truncate(len);
    }
}

impl FileResource for InMemoryFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.read();
        let start = match usize::try_from(offset) {
            Ok(start) if start < data.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn append(&self, new_data: &[u8]) -> io::Result<()> {
        self.data.write().extend_from_slice(new_data);
        Ok(())
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn sync(&self) -> io::Result<()> {
        // Nothing below memory to sync to
        Ok(())
    }
}
