//! NDJSON Frame Decoder
//!
//! Reassembles complete JSON records from an HTTP response body that arrives
//! as arbitrary byte chunks. Ollama streams newline-delimited JSON, but chunk
//! boundaries never line up with record boundaries: a record can be split
//! across chunks, and a chunk can carry several records plus the head of the
//! next one.
//!
//! One decoder is created per in-flight call and discarded with it; the
//! buffered tail of a broken connection is never reused.
//!
//! # Contract
//!
//! - Records are emitted in exact byte-arrival order, independent of chunking.
//! - A parse failure on a non-terminal segment is a protocol violation: it is
//!   reported as a [`DecodeError`] and the decoder resumes after the
//!   malformed segment. It never aborts the stream.
//! - The segment after the final separator is retained as the new buffer; a
//!   trailing fragment at end-of-stream is dropped, not emitted ([`finish`]).
//!
//! [`finish`]: NdjsonDecoder::finish

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// A non-terminal NDJSON segment that failed to parse.
#[derive(Debug, Error)]
#[error("malformed NDJSON segment {segment:?}: {source}")]
pub struct DecodeError {
    /// The offending segment (lossy UTF-8, for diagnostics)
    pub segment: String,
    /// The underlying JSON error
    #[source]
    pub source: serde_json::Error,
}

/// Incremental decoder for newline-delimited JSON records of type `T`.
///
/// The buffer holds raw bytes rather than text so a multi-byte UTF-8
/// sequence split across chunk boundaries survives intact.
#[derive(Debug)]
pub struct NdjsonDecoder<T> {
    buffer: Vec<u8>,
    _record: PhantomData<T>,
}

impl<T> Default for NdjsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NdjsonDecoder<T> {
    /// Create a decoder with an empty frame buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Number of buffered bytes not yet terminated by a separator.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Consume the decoder at end-of-stream.
    ///
    /// Returns the unterminated trailing fragment, if any, so the caller can
    /// log it. The fragment is never parsed or emitted: a server that closes
    /// the connection mid-record is accepted behavior, not an error.
    #[must_use]
    pub fn finish(self) -> Option<String> {
        let tail = self.buffer;
        let trimmed = tail.trim_ascii();
        if trimmed.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(trimmed).into_owned())
        }
    }
}

impl<T: DeserializeOwned> NdjsonDecoder<T> {
    /// Feed one chunk of bytes, returning every record completed by it.
    ///
    /// Each returned element is either a parsed record or a [`DecodeError`]
    /// for a malformed non-terminal segment. Blank segments are skipped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<T, DecodeError>> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let segment: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = segment[..segment.len() - 1].trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<T>(line) {
                Ok(record) => records.push(Ok(record)),
                Err(source) => records.push(Err(DecodeError {
                    segment: String::from_utf8_lossy(line).into_owned(),
                    source,
                })),
            }
        }
        records
    }
}
