//! The file capability the buffering layers are built on.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::sync::Arc;

/// A byte resource that buffered files read from and append to.
///
/// This is the whole contract the buffering layers need. A local file, an
/// in-memory buffer or a proxy to a remote block device can all sit behind
/// it.
///
/// # Invariants
///
/// - `read_at` never moves a cursor that `append` relies on
/// - `append` writes every byte of `data` after the current end
/// - `size` reflects every completed `append`
/// - Resources must be `Send + Sync`; readers and the writer share them
///
/// # Implementors
///
/// - [`std::fs::File`] - positional reads, appends at end of file
/// - [`super::InMemoryFile`] - for testing
/// - [`Arc<T>`] - shares one resource between several buffered files
pub trait FileResource: Send + Sync {
    /// Reads into `buf` starting at `offset`.
    ///
    /// Fills as much of `buf` as the resource holds past `offset` and returns
    /// the number of bytes read, which is `0` at or past the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Appends all of `data` at the current end of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. Some prefix of `data` may
    /// have been written.
    fn append(&self, data: &[u8]) -> io::Result<()>;

    /// Returns the current length of the resource in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata query fails.
    fn size(&self) -> io::Result<u64>;

    /// Pushes written data and metadata to stable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    fn sync(&self) -> io::Result<()>;
}

#[cfg(any(unix, windows))]
impl FileResource for File {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match positional_read(self, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn append(&self, data: &[u8]) -> io::Result<()> {
        let mut file = self;
        file.seek(SeekFrom::End(0))?;
        file.write_all(data)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_all()
    }
}

#[cfg(unix)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}

impl<T: FileResource + ?Sized> FileResource for Arc<T> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn append(&self, data: &[u8]) -> io::Result<()> {
        (**self).append(data)
    }

    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }
}
