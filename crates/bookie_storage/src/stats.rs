//! Buffer statistics.
//!
//! Counters for exporting cache and flush behaviour to a metrics system.
//!
//! # Usage
//!
//! ```rust
//! use bookie_storage::{InMemoryFile, ReadBufferedFile};
//!
//! let file = ReadBufferedFile::new(InMemoryFile::with_data(vec![7; 32]), 16).unwrap();
//! let mut buf = [0u8; 4];
//! file.read_at(&mut buf, 0).unwrap();
//!
//! let stats = file.stats().snapshot();
//! assert_eq!(stats.read_invocations, 1);
//! assert_eq!(stats.cache_misses, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-instance counters of a buffered file.
///
/// All counters are atomic and can be read while operations are in progress.
/// They only ever increase; there is no reset.
#[derive(Debug, Default)]
pub struct BufferStats {
    // Read side
    /// Number of `read_at` calls.
    read_invocations: AtomicU64,
    /// Number of copies served from the read window.
    cache_hits: AtomicU64,
    /// Number of window refills from the resource.
    cache_misses: AtomicU64,
    /// Bytes delivered to `read_at` callers.
    bytes_read: AtomicU64,

    // Write side
    /// Number of `write` calls.
    writes: AtomicU64,
    /// Bytes accepted by `write`.
    bytes_written: AtomicU64,
    /// Number of write buffers pushed to the resource.
    flushes: AtomicU64,
}

impl BufferStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read_invocation(&self) {
        self.read_invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bytes_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of `read_at` calls.
    pub fn read_invocations(&self) -> u64 {
        self.read_invocations.load(Ordering::Relaxed)
    }

    /// Returns the number of copies served from the read window.
    ///
    /// A copy that follows a refill counts as a hit as well.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Returns the number of window refills.
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Returns the bytes delivered to readers.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the number of `write` calls.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the bytes accepted by `write`.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the number of flushes.
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            read_invocations: self.read_invocations(),
            cache_hits: self.cache_hits(),
            cache_misses: self.cache_misses(),
            bytes_read: self.bytes_read(),
            writes: self.writes(),
            bytes_written: self.bytes_written(),
            flushes: self.flushes(),
        }
    }
}

/// A point-in-time copy of [`BufferStats`].
///
/// Counters are loaded one by one, so a snapshot taken during I/O may
/// mix values from slightly different moments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Number of `read_at` calls.
    pub read_invocations: u64,
    /// Number of copies served from the read window.
    pub cache_hits: u64,
    /// Number of window refills.
    pub cache_misses: u64,
    /// Bytes delivered to readers.
    pub bytes_read: u64,
    /// Number of `write` calls.
    pub writes: u64,
    /// Bytes accepted by `write`.
    pub bytes_written: u64,
    /// Number of flushes.
    pub flushes: u64,
}
