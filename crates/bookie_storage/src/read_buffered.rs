//! Read-buffered file with a single lookahead window.

use crate::backend::FileResource;
use crate::config::{check_capacity, BufferConfig};
use crate::error::{StorageError, StorageResult};
use crate::file::SizedFile;
use crate::stats::BufferStats;
use parking_lot::Mutex;
use std::ops::Range;
use tracing::{debug, trace};

/// A file whose random-access reads go through one cached window.
///
/// On a miss the window is replaced wholesale by a single read of up to
/// `capacity` bytes starting at the missed offset. There is exactly one
/// window; nothing is evicted piecemeal.
///
/// # Thread Safety
///
/// Readers serialize on an internal lock held for the whole of
/// [`read_at`](Self::read_at). Counters are atomic and can be read at
/// any time.
///
/// # Consistency
///
/// The window is not invalidated by writes to the resource. Bytes cached
/// before an out-of-band modification are served until the window moves
/// or [`clear`](Self::clear) is called.
///
/// # Example
///
/// ```rust
/// use bookie_storage::{InMemoryFile, ReadBufferedFile};
///
/// let file = ReadBufferedFile::new(InMemoryFile::with_data(b"hello world".to_vec()), 4).unwrap();
///
/// let mut buf = [0u8; 5];
/// assert_eq!(file.read_at(&mut buf, 6).unwrap(), Some(5));
/// assert_eq!(&buf, b"world");
/// assert_eq!(file.read_at(&mut buf, 11).unwrap(), None);
/// ```
#[derive(Debug)]
pub struct ReadBufferedFile<R> {
    file: SizedFile<R>,
    capacity: usize,
    window: Mutex<ReadWindow>,
    stats: BufferStats,
}

/// The cached byte range. `start == None` means nothing is cached.
#[derive(Debug)]
struct ReadWindow {
    buf: Box<[u8]>,
    start: Option<u64>,
    filled: usize,
}

impl ReadWindow {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            start: None,
            filled: 0,
        }
    }

    /// Returns the cached bytes from `pos` to the end of the window.
    fn lookup(&self, pos: u64) -> Option<&[u8]> {
        let start = self.start?;
        let rel = usize::try_from(pos.checked_sub(start)?).ok()?;
        if rel < self.filled {
            Some(&self.buf[rel..self.filled])
        } else {
            None
        }
    }

    fn range(&self) -> Option<Range<u64>> {
        self.start.map(|start| start..start + self.filled as u64)
    }

    /// Replaces the window with the bytes of `file` starting at `pos`.
    fn refill<R: FileResource>(&mut self, file: &R, pos: u64, size: u64) -> StorageResult<()> {
        self.clear();
        let n = file.read_at(pos, &mut self.buf)?;
        if n == 0 {
            return Err(StorageError::ShortRead { offset: pos, size });
        }
        self.start = Some(pos);
        self.filled = n;
        Ok(())
    }

    fn clear(&mut self) {
        self.start = None;
        self.filled = 0;
    }
}

impl<R: FileResource> ReadBufferedFile<R> {
    /// Wraps `file` with a read window of `read_capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidCapacity`] if `read_capacity` is zero.
    pub fn new(file: R, read_capacity: usize) -> StorageResult<Self> {
        check_capacity("read", read_capacity)?;
        Ok(Self {
            file: SizedFile::new(file),
            capacity: read_capacity,
            window: Mutex::new(ReadWindow::new(read_capacity)),
            stats: BufferStats::new(),
        })
    }

    /// Wraps `file` using the read capacity from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidCapacity`] if the read capacity is zero.
    pub fn with_config(file: R, config: &BufferConfig) -> StorageResult<Self> {
        Self::new(file, config.read_capacity)
    }

    /// Reads bytes starting at `start` into `dest`.
    ///
    /// Returns `Ok(None)` when `start` is at or past the end of the file.
    /// Otherwise returns `Ok(Some(n))` where `n` is `dest.len()` or, near the
    /// end of the file, the number of bytes that remain. Bytes of `dest`
    /// past `n` are left untouched.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Io`] if the size query or a refill read fails
    /// - [`StorageError::ShortRead`] if a refill returned no bytes although
    ///   the size said they exist
    ///
    /// On error a prefix of `dest` may already hold copied bytes.
    pub fn read_at(&self, dest: &mut [u8], start: u64) -> StorageResult<Option<usize>> {
        let mut window = self.window.lock();
        self.stats.record_read_invocation();

        let size = self.file.size()?;
        if start >= size {
            return Ok(None);
        }

        let mut copied = 0;
        while copied < dest.len() {
            let pos = start + copied as u64;
            if let Some(cached) = window.lookup(pos) {
                let n = cached.len().min(dest.len() - copied);
                dest[copied..copied + n].copy_from_slice(&cached[..n]);
                copied += n;
                self.stats.record_cache_hit();
                trace!(offset = pos, len = n, "read window hit");
            } else if pos >= size {
                break;
            } else {
                window.refill(self.file.get_ref(), pos, size)?;
                self.stats.record_cache_miss();
                debug!(offset = pos, filled = window.filled, "read window refilled");
            }
        }

        self.stats.record_bytes_read(copied as u64);
        Ok(Some(copied))
    }

    /// Discards the cached window so the next read goes to the resource.
    ///
    /// Counters are not touched. Calling this twice in a row is the same as
    /// calling it once.
    pub fn clear(&self) {
        self.window.lock().clear();
    }

    /// Returns the file range currently mirrored by the window, if any.
    pub fn cached_range(&self) -> Option<Range<u64>> {
        self.window.lock().range()
    }

    /// Returns the read window capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the counters of this file.
    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Returns the sized handle of the underlying resource.
    pub fn file(&self) -> &SizedFile<R> {
        &self.file
    }

    /// Unwraps the buffered file, returning the resource.
    pub fn into_inner(self) -> R {
        self.file.into_inner()
    }
}
