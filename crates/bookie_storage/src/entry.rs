//! Ledger entry identifiers and stored records.

use std::cmp::Ordering;
use std::fmt;

/// Identifies one entry of one ledger.
///
/// Keys order by ledger first, then by entry within the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntryKey {
    /// The ledger the entry belongs to.
    pub ledger_id: u64,
    /// The entry's position within its ledger.
    pub entry_id: u64,
}

impl EntryKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(ledger_id: u64, entry_id: u64) -> Self {
        Self {
            ledger_id,
            entry_id,
        }
    }
}

impl From<(u64, u64)> for EntryKey {
    fn from((ledger_id, entry_id): (u64, u64)) -> Self {
        Self::new(ledger_id, entry_id)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ledger_id, self.entry_id)
    }
}

/// An entry payload together with where it lives in the ledger file.
///
/// `length` is the payload length recorded when the entry was written. It is
/// carried as given and never checked against `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryKeyValue {
    key: EntryKey,
    value: Vec<u8>,
    offset: u32,
    length: u32,
}

impl EntryKeyValue {
    /// Creates a record.
    #[must_use]
    pub fn new(key: EntryKey, value: Vec<u8>, offset: u32, length: u32) -> Self {
        Self {
            key,
            value,
            offset,
            length,
        }
    }

    /// Returns the entry's key.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// Returns the payload.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Byte offset of the payload within the ledger file.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Recorded payload length.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Consumes the record, returning the payload.
    #[must_use]
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }
}

impl PartialOrd for EntryKeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Records sort by key; payload and position only break ties.
impl Ord for EntryKeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.offset.cmp(&other.offset))
            .then_with(|| self.length.cmp(&other.length))
            .then_with(|| self.value.cmp(&other.value))
    }
}
