//! Read-write-buffered file: a read window plus an append buffer.

use crate::backend::FileResource;
use crate::config::{check_capacity, BufferConfig};
use crate::error::{StorageError, StorageResult};
use crate::read_buffered::ReadBufferedFile;
use crate::stats::BufferStats;
use parking_lot::Mutex;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, warn};

/// A ledger file that buffers appends and caches reads.
///
/// Writes accumulate in a fixed-size buffer that is pushed to the resource
/// whenever it fills. Two positions describe the write side:
///
/// - [`logical_position`](Self::logical_position): the offset the next
///   written byte will get
/// - [`flushed_position`](Self::flushed_position): every byte before it is
///   in the resource
///
/// Bytes between the two exist only in memory. Both positions start at the
/// resource's length, so reopening a file appends after its contents.
///
/// # Thread Safety
///
/// The read window and the write buffer have separate locks, so a reader
/// never waits for a flush and the writer never waits for a refill. Both
/// positions are atomics and can be polled without taking either lock.
/// One writer at a time is assumed; concurrent `write` calls serialize but
/// interleave whole calls in unspecified order.
///
/// # Consistency
///
/// Reads only see the resource. Reading at or past `flushed_position` may
/// return end-of-file or stale bytes; callers read offsets they know are
/// flushed.
///
/// # Failed flushes
///
/// If pushing the buffer to the resource fails, the instance is poisoned:
/// every later `write`, `flush` and `sync` returns
/// [`StorageError::Poisoned`]. Reads keep working.
///
/// Pending bytes are discarded on drop. Call [`flush`](Self::flush) first.
///
/// # Example
///
/// ```rust
/// use bookie_storage::{InMemoryFile, ReadWriteBufferedFile};
///
/// let file = ReadWriteBufferedFile::new(InMemoryFile::new(), 16, 10).unwrap();
/// let offset = file.write(&[7u8; 20]).unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(file.logical_position(), 20);
/// assert_eq!(file.flushed_position(), 16);
///
/// file.flush().unwrap();
/// assert_eq!(file.flushed_position(), 20);
/// ```
#[derive(Debug)]
pub struct ReadWriteBufferedFile<R> {
    reader: ReadBufferedFile<R>,
    write_capacity: usize,
    pending: Mutex<WriteBuffer>,
    write_head: AtomicU64,
    flush_boundary: AtomicU64,
    poisoned: AtomicBool,
}

#[derive(Debug)]
struct WriteBuffer {
    buf: Box<[u8]>,
    len: usize,
}

impl WriteBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Copies as much of `src` as fits and returns how much was taken.
    fn push(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.buf.len() - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&src[..n]);
        self.len += n;
        n
    }

    fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<R: FileResource> ReadWriteBufferedFile<R> {
    /// Wraps `file` with a write buffer and a read window.
    ///
    /// Positions start at the current length of `file`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidCapacity`] if either capacity is zero
    /// - [`StorageError::Io`] if the length of `file` cannot be read
    pub fn new(file: R, write_capacity: usize, read_capacity: usize) -> StorageResult<Self> {
        check_capacity("write", write_capacity)?;
        let reader = ReadBufferedFile::new(file, read_capacity)?;
        let size = reader.file().size()?;

        Ok(Self {
            reader,
            write_capacity,
            pending: Mutex::new(WriteBuffer::new(write_capacity)),
            write_head: AtomicU64::new(size),
            flush_boundary: AtomicU64::new(size),
            poisoned: AtomicBool::new(false),
        })
    }

    /// Wraps `file` using both capacities from `config`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_config(file: R, config: &BufferConfig) -> StorageResult<Self> {
        Self::new(file, config.write_capacity, config.read_capacity)
    }

    /// Appends `src`, flushing each time the write buffer fills.
    ///
    /// Returns the logical offset at which `src` begins. When this returns,
    /// every byte of `src` is either pending or in the resource. Nothing is
    /// made durable beyond the buffers that filled.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Poisoned`] if an earlier flush failed
    /// - [`StorageError::Io`] if a flush fails now; the instance is then
    ///   poisoned
    pub fn write(&self, src: &[u8]) -> StorageResult<u64> {
        let mut pending = self.pending.lock();
        self.check_poisoned()?;

        let offset = self.write_head.load(Ordering::Acquire);
        if src.is_empty() {
            return Ok(offset);
        }

        let mut consumed = 0;
        while consumed < src.len() {
            let n = pending.push(&src[consumed..]);
            consumed += n;
            // Advance before flushing so flushed_position never passes it.
            self.write_head.fetch_add(n as u64, Ordering::AcqRel);
            if pending.is_full() {
                self.flush_locked(&mut pending)?;
            }
        }

        self.stats().record_write(src.len() as u64);
        Ok(offset)
    }

    /// Pushes pending bytes to the resource, even if the buffer is not full.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Poisoned`] if an earlier flush failed
    /// - [`StorageError::Io`] if the write or size query fails; the instance
    ///   is then poisoned
    pub fn flush(&self) -> StorageResult<()> {
        let mut pending = self.pending.lock();
        self.check_poisoned()?;
        self.flush_locked(&mut pending)
    }

    /// Flushes, then asks the resource to make everything durable.
    ///
    /// # Errors
    ///
    /// Same as [`flush`](Self::flush), plus [`StorageError::Io`] if the
    /// sync itself fails.
    pub fn sync(&self) -> StorageResult<()> {
        let mut pending = self.pending.lock();
        self.check_poisoned()?;
        self.flush_locked(&mut pending)?;
        self.reader.file().get_ref().sync()?;
        Ok(())
    }

    fn flush_locked(&self, pending: &mut WriteBuffer) -> StorageResult<()> {
        if pending.len == 0 {
            return Ok(());
        }

        let file = self.reader.file();
        let result = file
            .get_ref()
            .append(pending.filled())
            .map_err(StorageError::from)
            .and_then(|()| file.size());

        match result {
            Ok(size) => {
                let flushed = pending.len;
                pending.len = 0;
                self.flush_boundary.store(size, Ordering::Release);
                self.stats().record_flush();
                debug!(bytes = flushed, flushed_position = size, "write buffer flushed");
                Ok(())
            }
            Err(err) => {
                self.poisoned.store(true, Ordering::Release);
                warn!(
                    error = %err,
                    pending = pending.len,
                    flushed_position = self.flushed_position(),
                    "flush failed, write side poisoned"
                );
                Err(err)
            }
        }
    }

    fn check_poisoned(&self) -> StorageResult<()> {
        if self.poisoned.load(Ordering::Acquire) {
            return Err(StorageError::Poisoned);
        }
        Ok(())
    }

    /// Offset the next written byte will get; includes pending bytes.
    pub fn logical_position(&self) -> u64 {
        self.write_head.load(Ordering::Acquire)
    }

    /// Offset below which every written byte is in the resource.
    pub fn flushed_position(&self) -> u64 {
        self.flush_boundary.load(Ordering::Acquire)
    }

    /// Number of bytes accepted but not yet flushed.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len
    }

    /// Returns true once a failed flush has poisoned the write side.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Reads through the read window; see [`ReadBufferedFile::read_at`].
    ///
    /// # Errors
    ///
    /// Same as [`ReadBufferedFile::read_at`].
    pub fn read_at(&self, dest: &mut [u8], start: u64) -> StorageResult<Option<usize>> {
        self.reader.read_at(dest, start)
    }

    /// Discards the read window.
    pub fn clear(&self) {
        self.reader.clear();
    }

    /// Returns the file range currently mirrored by the read window.
    pub fn cached_range(&self) -> Option<Range<u64>> {
        self.reader.cached_range()
    }

    /// Returns the write buffer capacity.
    pub fn write_capacity(&self) -> usize {
        self.write_capacity
    }

    /// Returns the read side.
    pub fn reader(&self) -> &ReadBufferedFile<R> {
        &self.reader
    }

    /// Returns the counters shared by both sides.
    pub fn stats(&self) -> &BufferStats {
        self.reader.stats()
    }

    /// Unwraps the file, returning the resource. Pending bytes are dropped.
    pub fn into_inner(mut self) -> R {
        let pending = self.pending.get_mut().len;
        if pending > 0 {
            warn!(
                pending,
                flushed_position = self.flushed_position(),
                "unwrapping file with unflushed bytes, discarding them"
            );
        }
        self.reader.into_inner()
    }
}
