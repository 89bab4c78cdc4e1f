//! Error types for buffered file operations.

use std::io;
use thiserror::Error;

/// Result type for buffered file operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing through a buffered file.
///
/// Reaching the end of the file is not an error; `read_at` reports it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying resource failed a stat, read, write or sync.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The resource returned no bytes where its size said bytes exist.
    ///
    /// Either the file was truncated concurrently or the resource layer
    /// is broken. The read is abandoned, never retried.
    #[error("short read: no bytes at offset {offset}, resource size {size}")]
    ShortRead {
        /// The offset the window refill started at.
        offset: u64,
        /// The resource size observed at the start of the read.
        size: u64,
    },

    /// A buffer capacity of zero was requested.
    #[error("{which} capacity must be greater than zero")]
    InvalidCapacity {
        /// Which buffer was misconfigured ("read" or "write").
        which: &'static str,
    },

    /// An earlier flush failed; the write side no longer matches the file.
    #[error("write buffer poisoned by a failed flush")]
    Poisoned,
}

impl StorageError {
    /// Returns true for failures that say nothing about data integrity.
    ///
    /// Callers may choose to retry these once the resource recovers.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
