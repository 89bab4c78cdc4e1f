//! Buffer configuration.

use crate::error::{StorageError, StorageResult};

/// Default read window size (64 KiB).
pub const DEFAULT_READ_CAPACITY: usize = 64 * 1024;

/// Default write buffer size (64 KiB).
pub const DEFAULT_WRITE_CAPACITY: usize = 64 * 1024;

/// Capacities for the read window and the write buffer.
///
/// Both are fixed for the lifetime of a buffered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Size of the single read lookahead window.
    pub read_capacity: usize,

    /// Size of the write accumulation buffer; a full buffer is flushed.
    pub write_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            read_capacity: DEFAULT_READ_CAPACITY,
            write_capacity: DEFAULT_WRITE_CAPACITY,
        }
    }
}

impl BufferConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read window size.
    #[must_use]
    pub const fn read_capacity(mut self, capacity: usize) -> Self {
        self.read_capacity = capacity;
        self
    }

    /// Sets the write buffer size.
    #[must_use]
    pub const fn write_capacity(mut self, capacity: usize) -> Self {
        self.write_capacity = capacity;
        self
    }

    /// Checks that both capacities are positive.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidCapacity`] naming the zero-sized buffer.
    pub fn validate(&self) -> StorageResult<()> {
        check_capacity("read", self.read_capacity)?;
        check_capacity("write", self.write_capacity)
    }
}

pub(crate) fn check_capacity(which: &'static str, capacity: usize) -> StorageResult<()> {
    if capacity == 0 {
        return Err(StorageError::InvalidCapacity { which });
    }
    Ok(())
}
