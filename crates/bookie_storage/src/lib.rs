//! # Bookie Storage
//!
//! Buffered file I/O for ledger storage nodes.
//!
//! This crate is the lowest I/O layer under a ledger's entry files. It knows
//! nothing about entry formats or indexes; it moves bytes between callers
//! and a [`FileResource`].
//!
//! ## Layers
//!
//! - [`SizedFile`] - a resource handle that reports its current length
//! - [`ReadBufferedFile`] - random-access reads through a single cached window
//! - [`ReadWriteBufferedFile`] - adds a fixed-size append buffer and tracks
//!   the logical and flushed write positions
//!
//! ## Design Principles
//!
//! - Reads and writes use separate locks and never wait on each other
//! - Write positions are atomics, readable without any lock
//! - Reads only see flushed bytes; callers read below `flushed_position`
//! - Errors are propagated, never retried here
//!
//! ## Example
//!
//! ```rust
//! use bookie_storage::{InMemoryFile, ReadWriteBufferedFile};
//!
//! let file = ReadWriteBufferedFile::new(InMemoryFile::new(), 16, 10).unwrap();
//! let offset = file.write(b"entry payload").unwrap();
//! file.flush().unwrap();
//!
//! let mut buf = [0u8; 13];
//! assert_eq!(file.read_at(&mut buf, offset).unwrap(), Some(13));
//! assert_eq!(&buf, b"entry payload");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod entry;
mod error;
mod file;
mod memory;
mod read_buffered;
mod read_write_buffered;
mod stats;

pub use backend::FileResource;
pub use config::{BufferConfig, DEFAULT_READ_CAPACITY, DEFAULT_WRITE_CAPACITY};
pub use entry::{EntryKey, EntryKeyValue};
pub use error::{StorageError, StorageResult};
pub use file::SizedFile;
pub use memory::InMemoryFile;
pub use read_buffered::ReadBufferedFile;
pub use read_write_buffered::ReadWriteBufferedFile;
pub use stats::{BufferStats, StatsSnapshot};
