use std::{borrow::Cow, io};

use bytes::{Buf as _, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

/// The prefix that marks a line as a data frame.
const DATA_PREFIX: &str = "data:";

/// Decodes newline-delimited `data:` frames from a byte stream.
///
/// Lines that do not start with `data:` (after trimming whitespace) are
/// separators or comments and are skipped without error. The yielded item is
/// the frame payload, with the prefix and surrounding whitespace removed.
///
/// A trailing line that is not terminated by a newline when the stream ends is
/// dropped, never surfaced as a frame.
///
/// Bytes that are not valid UTF-8 are replaced with `U+FFFD`; the frame is
/// still delivered.
#[derive(Debug, Default, Clone)]
pub struct FrameCodec {
    /// Offset in the buffer up to which no newline was found.
    next_index: usize,
}

impl FrameCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                self.next_index = src.len();
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if let Some(payload) = frame_payload(&line) {
                return Ok(Some(payload));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload) = self.decode(src)? {
            return Ok(Some(payload));
        }

        if !src.is_empty() {
            debug!(bytes = src.len(), "Dropping incomplete trailing frame.");
            src.advance(src.len());
        }
        self.next_index = 0;

        Ok(None)
    }
}

/// Incremental frame decoder for callers that receive raw increments rather
/// than an `AsyncRead`.
///
/// Each call to [`FrameDecoder::push`] appends to a single buffer that
/// persists across calls, and returns every frame completed by the increment.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    codec: FrameCodec,
    buffer: BytesMut,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an increment and return the payloads of all frames it
    /// completes, in order.
    pub fn push(&mut self, increment: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(increment);

        let mut frames = vec![];
        // `FrameCodec::decode` never fails.
        while let Ok(Some(payload)) = self.codec.decode(&mut self.buffer) {
            frames.push(payload);
        }

        trace!(
            frames = frames.len(),
            buffered = self.buffer.len(),
            "Decoded increment."
        );

        frames
    }

    /// Number of bytes held back as an incomplete line.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// End the stream, discarding any incomplete trailing line.
    ///
    /// Returns the number of bytes that were dropped.
    pub fn finish(self) -> usize {
        let dropped = self.buffer.len();
        if dropped > 0 {
            debug!(bytes = dropped, "Dropping incomplete trailing frame.");
        }

        dropped
    }
}

/// Extract the payload of a single line, if it is a data frame.
fn frame_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    if matches!(line, Cow::Owned(_)) {
        debug!("Replaced invalid UTF-8 in line.");
    }

    line.trim()
        .strip_prefix(DATA_PREFIX)
        .map(|payload| payload.trim_start().to_owned())
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
