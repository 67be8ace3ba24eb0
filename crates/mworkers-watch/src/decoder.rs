//! Decoder for packed inotify-style notification records.
//!
//! Each read from the notification channel yields zero or more records laid
//! out back to back:
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬─────────────────────────┐
//! │ wd (i32) │ mask u32 │cookie u32│ len u32  │ name: len bytes, NUL pad │
//! └──────────┴──────────┴──────────┴──────────┴─────────────────────────┘
//! ```
//!
//! Integers are in native byte order. The decoder keeps a single reusable
//! buffer and a cursor into it, and only reads again once every record of
//! the previous read has been handed out.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::io::Read;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Size of the fixed record header.
pub const HEADER_LEN: usize = 16;

/// Maximum path length, including the terminating NUL.
pub const PATH_MAX: usize = 4096;

/// Size of the read buffer: one header plus the longest possible name.
pub const BUFFER_LEN: usize = HEADER_LEN + PATH_MAX;

/// One decoded notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Watch descriptor the event belongs to
    pub wd: i32,
    /// Event mask bits
    pub mask: u32,
    /// Cookie linking rename halves
    pub cookie: u32,
    /// Name relative to the watched directory, `None` when the event concerns
    /// the directory itself
    pub name: Option<PathBuf>,
}

/// Turns a byte stream of packed records into file identifiers.
///
/// End of stream (EOF, a failed read, or a read too short to hold one header)
/// is sticky: once reported, later calls report it again without reading.
pub struct NotificationDecoder<R> {
    reader: R,
    watch_dir: PathBuf,
    buf: Box<[u8]>,
    /// Offset of the next undelivered record
    offset: usize,
    /// Bytes of `buf` filled by the last read
    filled: usize,
    finished: bool,
}

impl<R: Read> NotificationDecoder<R> {
    /// Create a decoder over `reader` for events on `watch_dir`.
    pub fn new(reader: R, watch_dir: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            watch_dir: watch_dir.into(),
            buf: vec![0u8; BUFFER_LEN].into_boxed_slice(),
            offset: 0,
            filled: 0,
            finished: false,
        }
    }

    /// Directory whose identifier is reported for unnamed records.
    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    /// Bytes from the last read not yet decoded.
    pub fn remaining(&self) -> usize {
        self.filled - self.offset
    }

    /// Release the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Decode the next record, reading from the channel if the buffer is drained.
    ///
    /// Returns `Ok(None)` at end of stream and [`Error::Corruption`] when a
    /// record does not fit in the bytes that were read.
    pub fn next_event(&mut self) -> Result<Option<RawEvent>> {
        if self.finished {
            return Ok(None);
        }
        if self.remaining() == 0 && !self.fill()? {
            self.finished = true;
            return Ok(None);
        }

        let available = self.remaining();
        if available < HEADER_LEN {
            return Err(Error::Corruption {
                declared: HEADER_LEN,
                available,
            });
        }

        let record = &self.buf[self.offset..self.filled];
        let wd = i32::from_ne_bytes(field(record, 0));
        let mask = u32::from_ne_bytes(field(record, 4));
        let cookie = u32::from_ne_bytes(field(record, 8));
        let len = u32::from_ne_bytes(field(record, 12)) as usize;

        let span = match HEADER_LEN.checked_add(len) {
            Some(span) if span <= available => span,
            declared => {
                return Err(Error::Corruption {
                    declared: declared.unwrap_or(usize::MAX),
                    available,
                })
            }
        };

        let raw_name = &record[HEADER_LEN..span];
        let name_len = raw_name.iter().position(|b| *b == 0).unwrap_or(raw_name.len());
        let name = (name_len > 0)
            .then(|| PathBuf::from(OsStr::from_bytes(&raw_name[..name_len])));

        self.offset += span;
        if self.remaining() == 0 {
            self.offset = 0;
            self.filled = 0;
        }

        trace!(wd, mask, cookie, ?name, "decoded notification");
        Ok(Some(RawEvent {
            wd,
            mask,
            cookie,
            name,
        }))
    }

    /// Decode the next file identifier.
    ///
    /// Named records yield their name; unnamed records yield the watched
    /// directory.
    pub fn next_path(&mut self) -> Result<Option<PathBuf>> {
        Ok(self
            .next_event()?
            .map(|event| event.name.unwrap_or_else(|| self.watch_dir.clone())))
    }

    /// Perform one blocking read. Returns false at end of stream.
    fn fill(&mut self) -> Result<bool> {
        self.offset = 0;
        self.filled = 0;

        match self.reader.read(&mut self.buf) {
            Ok(0) => {
                debug!("notification channel reached EOF");
                Ok(false)
            }
            Ok(n) if n < HEADER_LEN => {
                warn!(bytes = n, "short read from notification channel");
                Ok(false)
            }
            Ok(n) => {
                trace!(bytes = n, "read notification chunk");
                self.filled = n;
                Ok(true)
            }
            Err(e) => {
                warn!("notification channel read failed: {}", e);
                Ok(false)
            }
        }
    }
}

impl<R: Read> Iterator for NotificationDecoder<R> {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_path().transpose()
    }
}

fn field(record: &[u8], at: usize) -> [u8; 4] {
    [record[at], record[at + 1], record[at + 2], record[at + 3]]
}
