// this_file: src/sink.rs

//! Growable output accumulator for streamed encoder output.
//!
//! Encoders emit bytes in chunks of unknown size. [`OutputSink`] appends them
//! in order and carries a sticky failure flag: once an append cannot be
//! satisfied, everything accumulated so far is released and later appends
//! are ignored, so a failed encode never yields partial output.

use crate::error::{Error, Result};
use std::io;

/// Append-only byte buffer with a sticky allocation-failure flag.
#[derive(Debug, Default)]
pub struct OutputSink {
    bytes: Vec<u8>,
    failed: bool,
    failed_request: usize,
    limit: Option<usize>,
}

impl OutputSink {
    /// Create an empty, unbounded sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that refuses to grow beyond `limit` bytes.
    ///
    /// Exceeding the limit is treated exactly like an allocation failure.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Append one chunk.
    ///
    /// Zero-length chunks and writes after a failure are ignored.
    pub fn write_chunk(&mut self, chunk: &[u8]) {
        if chunk.is_empty() || self.failed {
            return;
        }

        let Some(total) = self.bytes.len().checked_add(chunk.len()) else {
            self.fail(usize::MAX);
            return;
        };
        if self.limit.is_some_and(|limit| total > limit) {
            self.fail(total);
            return;
        }
        if self.bytes.try_reserve_exact(chunk.len()).is_err() {
            self.fail(total);
            return;
        }
        self.bytes.extend_from_slice(chunk);
    }

    /// Accumulated length in bytes. Zero after a failure.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return true when nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Return true once an append has failed.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Accumulated bytes so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the accumulated bytes.
    ///
    /// Returns [`Error::OutOfMemory`] if any append failed.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if self.failed {
            return Err(Error::OutOfMemory {
                requested: self.failed_request,
            });
        }
        Ok(self.bytes)
    }

    fn fail(&mut self, requested: usize) {
        log::error!(
            "Output sink failed to grow to {} bytes, discarding {} accumulated bytes",
            requested,
            self.bytes.len()
        );
        self.bytes = Vec::new();
        self.failed = true;
        self.failed_request = requested;
    }
}

impl io::Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf);
        if self.failed {
            return Err(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "output sink allocation failed",
            ));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
