//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

use mworkers_watch::decoder::HEADER_LEN;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::Once;

/// IN_CLOSE_WRITE
pub const CLOSE_WRITE: u32 = 0x0000_0008;

static TRACING: Once = Once::new();

/// Route pipeline logs to the test harness when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Encode one notification record, NUL padding the name to `padded_len`.
pub fn encode_entry(wd: i32, name: &str, padded_len: usize) -> Vec<u8> {
    let len = if name.is_empty() {
        0
    } else {
        padded_len.max(name.len() + 1)
    };
    let mut bytes = Vec::with_capacity(HEADER_LEN + len);
    bytes.extend_from_slice(&wd.to_ne_bytes());
    bytes.extend_from_slice(&CLOSE_WRITE.to_ne_bytes());
    bytes.extend_from_slice(&0u32.to_ne_bytes());
    bytes.extend_from_slice(&(len as u32).to_ne_bytes());
    bytes.extend_from_slice(name.as_bytes());
    bytes.resize(HEADER_LEN + len, 0);
    bytes
}

/// Pack several names into one read's worth of records.
pub fn packed(names: &[&str]) -> Vec<u8> {
    names
        .iter()
        .flat_map(|name| encode_entry(1, name, 16))
        .collect()
}

/// Reader that returns one predefined chunk per `read` call, then EOF.
pub struct ChunkedReader {
    chunks: VecDeque<Vec<u8>>,
    pub reads: usize,
}

impl ChunkedReader {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            reads: 0,
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        match self.chunks.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }
}
