//! Integration tests for one writer racing several readers.

use bookie_storage::{InMemoryFile, ReadWriteBufferedFile};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const WRITE_CAPACITY: usize = 64;
const READ_CAPACITY: usize = 48;
const TOTAL_BYTES: u64 = 64 * 1024;

/// The byte every writer puts at `offset`.
fn byte_at(offset: u64) -> u8 {
    (offset % 251) as u8
}

fn pattern(start: u64, len: usize) -> Vec<u8> {
    (start..start + len as u64).map(byte_at).collect()
}

#[test]
fn readers_see_exact_flushed_bytes_while_writer_appends() {
    let file = Arc::new(
        ReadWriteBufferedFile::new(InMemoryFile::new(), WRITE_CAPACITY, READ_CAPACITY).unwrap(),
    );
    let done = Arc::new(AtomicBool::new(false));
    let verified = Arc::new(AtomicUsize::new(0));

    let writer = {
        let file = Arc::clone(&file);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut written = 0u64;
            let mut chunk = 1usize;
            while written < TOTAL_BYTES {
                let len = chunk.min((TOTAL_BYTES - written) as usize);
                let offset = file.write(&pattern(written, len)).unwrap();
                assert_eq!(offset, written);
                written += len as u64;
                chunk = chunk % 97 + 1;
            }
            file.flush().unwrap();
            done.store(true, Ordering::Release);
        })
    };

    let readers: Vec<_> = (0..4u64)
        .map(|t| {
            let file = Arc::clone(&file);
            let done = Arc::clone(&done);
            let verified = Arc::clone(&verified);
            thread::spawn(move || {
                let mut seed = t * 7919 + 1;
                loop {
                    let finished = done.load(Ordering::Acquire);

                    let flushed = file.flushed_position();
                    let logical = file.logical_position();
                    assert!(flushed <= logical);

                    if flushed > 0 {
                        seed = seed
                            .wrapping_mul(6364136223846793005)
                            .wrapping_add(1442695040888963407);
                        let start = (seed >> 16) % flushed;
                        let len = ((seed >> 40) % 120) as usize + 1;
                        let mut dest = vec![0u8; len];

                        let n = file.read_at(&mut dest, start).unwrap().unwrap();
                        let expected = len.min((flushed - start) as usize);
                        assert!(n >= expected);
                        assert_eq!(dest[..n], pattern(start, n)[..]);

                        if let Some(range) = file.cached_range() {
                            assert!(range.end - range.start <= READ_CAPACITY as u64);
                        }
                        verified.fetch_add(1, Ordering::Relaxed);
                    }

                    if finished {
                        break;
                    }
                }
            })
        })
        .collect();

    writer.join().expect("writer panicked");
    for reader in readers {
        reader.join().expect("reader panicked");
    }

    assert_eq!(file.logical_position(), TOTAL_BYTES);
    assert_eq!(file.flushed_position(), TOTAL_BYTES);
    assert_eq!(file.pending_len(), 0);
    assert!(verified.load(Ordering::Relaxed) > 0);

    let mut all = vec![0u8; TOTAL_BYTES as usize];
    file.clear();
    assert_eq!(file.read_at(&mut all, 0).unwrap(), Some(TOTAL_BYTES as usize));
    assert_eq!(all, pattern(0, TOTAL_BYTES as usize));
}

#[test]
fn position_polling_needs_no_lock() {
    let file = Arc::new(ReadWriteBufferedFile::new(InMemoryFile::new(), 16, 16).unwrap());

    let poller = {
        let file = Arc::clone(&file);
        thread::spawn(move || {
            let mut last_flushed = 0;
            let mut last_logical = 0;
            for _ in 0..10_000 {
                let flushed = file.flushed_position();
                let logical = file.logical_position();
                assert!(flushed >= last_flushed);
                assert!(logical >= last_logical);
                assert!(flushed <= logical);
                last_flushed = flushed;
                last_logical = logical;
            }
        })
    };

    for i in 0..2_000u64 {
        file.write(&[byte_at(i); 3]).unwrap();
    }

    poller.join().expect("poller panicked");
    assert_eq!(file.logical_position(), 6_000);
    assert_eq!(file.flushed_position(), 6_000 - file.pending_len() as u64);
}
