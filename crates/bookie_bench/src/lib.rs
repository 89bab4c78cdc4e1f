//! Benchmark utilities.

use bookie_storage::{FileResource, InMemoryFile};
use rand::Rng;

/// Generate random payload data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` random read offsets below `limit`.
pub fn random_offsets(count: usize, limit: u64) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen_range(0..limit)).collect()
}

/// Build an in-memory ledger file holding `size` random bytes.
pub fn populated_file(size: usize) -> InMemoryFile {
    let file = InMemoryFile::new();
    file.append(&random_data(size))
        .expect("in-memory append cannot fail");
    file
}
