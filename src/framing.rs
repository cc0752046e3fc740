//! Line framing for the newline-delimited JSON stream
//!
//! The reader splits bytes on `\n`/`\r` and applies a cheap bracket-shape
//! check: a line is accepted when it starts with `{` and ends with `}`. No
//! JSON grammar is checked here, so `{garbage}` is still a record. Use
//! [`ImuSample::from_json`](crate::ImuSample::from_json) for full decoding.
//!
//! ```
//! use imu_serial_stream::{Frame, FrameReader};
//!
//! let mut reader = FrameReader::new();
//! let mut records = Vec::new();
//!
//! // Boot banner, then a record split across two reads
//! reader.feed(b"ICM-20948 ready\r\n{\"accX\":", |f| {
//!     if let Frame::Accepted(r) = f { records.push(r) }
//! });
//! reader.feed(b"1.0000}\r\n", |f| {
//!     if let Frame::Accepted(r) = f { records.push(r) }
//! });
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].as_bytes(), b"{\"accX\":1.0000}");
//! assert_eq!(reader.malformed_count(), 1);
//! ```

use std::borrow::Cow;
use std::fmt;

/// Returns true for the record delimiters `\n` and `\r`
#[inline]
pub fn is_delimiter(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Bracket-shape acceptance check on a delimiter-stripped line
pub fn is_accepted(line: &[u8]) -> bool {
    line.len() >= 2 && line[0] == b'{' && line[line.len() - 1] == b'}'
}

/// Why a completed line was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// First byte is not `{`
    MissingOpenBrace,
    /// Starts with `{` but does not end with a separate `}`
    MissingCloseBrace,
}

impl MalformedReason {
    fn classify(line: &[u8]) -> Self {
        if line.first() == Some(&b'{') {
            MalformedReason::MissingCloseBrace
        } else {
            MalformedReason::MissingOpenBrace
        }
    }
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingOpenBrace => write!(f, "missing opening brace"),
            MalformedReason::MissingCloseBrace => write!(f, "missing closing brace"),
        }
    }
}

/// One accepted record, delimiters stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(Vec<u8>);

impl Record {
    /// Raw record bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Record text, with invalid UTF-8 replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Record length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Accepted records are never empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the record bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Outcome of a completed (delimiter-terminated) line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Line passed the bracket-shape check
    Accepted(Record),
    /// Line was dropped; carries the reason and the dropped length
    Malformed { reason: MalformedReason, len: usize },
}

/// Delimiter-driven line scanner
///
/// Holds an unbounded accumulation buffer. Consecutive delimiters collapse,
/// so `\r\n` endings never produce empty lines. A trailing line with no
/// delimiter is held until one arrives and is never flushed on its own.
#[derive(Debug, Default)]
pub struct FrameReader {
    line: Vec<u8>,
    accepted: u64,
    malformed: u64,
}

impl FrameReader {
    /// Create a reader with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one byte
    ///
    /// Returns a frame when `byte` terminates a non-empty line.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        if !is_delimiter(byte) {
            self.line.push(byte);
            return None;
        }

        if self.line.is_empty() {
            return None;
        }

        let line = std::mem::take(&mut self.line);
        if is_accepted(&line) {
            self.accepted += 1;
            Some(Frame::Accepted(Record(line)))
        } else {
            self.malformed += 1;
            Some(Frame::Malformed {
                reason: MalformedReason::classify(&line),
                len: line.len(),
            })
        }
    }

    /// Process a chunk of any size, calling `on_frame` for each completed line
    pub fn feed<F>(&mut self, bytes: &[u8], mut on_frame: F)
    where
        F: FnMut(Frame),
    {
        for &byte in bytes {
            if let Some(frame) = self.push(byte) {
                on_frame(frame);
            }
        }
    }

    /// Lines accepted so far
    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }

    /// Lines dropped by the bracket check so far
    pub fn malformed_count(&self) -> u64 {
        self.malformed
    }

    /// Bytes of the current unterminated line
    pub fn pending_len(&self) -> usize {
        self.line.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(reader: &mut FrameReader, bytes: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        reader.feed(bytes, |f| frames.push(f));
        frames
    }

    fn accepted(frames: &[Frame]) -> Vec<Vec<u8>> {
        frames
            .iter()
            .filter_map(|f| match f {
                Frame::Accepted(r) => Some(r.as_bytes().to_vec()),
                Frame::Malformed { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_malformed_inputs_rejected() {
        for input in ["", "{", "}", "{incomplete", "not json at all"] {
            let mut reader = FrameReader::new();
            let mut bytes = input.as_bytes().to_vec();
            bytes.push(b'\n');

            let frames = collect(&mut reader, &bytes);
            assert!(accepted(&frames).is_empty(), "{:?} was accepted", input);
            assert_eq!(reader.accepted_count(), 0);
        }
    }

    #[test]
    fn test_malformed_reasons() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, b"{\n}\nhello}\n");
        assert_eq!(
            frames,
            vec![
                Frame::Malformed { reason: MalformedReason::MissingCloseBrace, len: 1 },
                Frame::Malformed { reason: MalformedReason::MissingOpenBrace, len: 1 },
                Frame::Malformed { reason: MalformedReason::MissingOpenBrace, len: 6 },
            ]
        );
        assert_eq!(reader.malformed_count(), 3);
    }

    #[test]
    fn test_crlf_collapses() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, b"{A}\r\n{B}\r\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(accepted(&frames), vec![b"{A}".to_vec(), b"{B}".to_vec()]);
    }

    #[test]
    fn test_plain_lines_collapse_to_two_frames() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, b"A\r\nB\r\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(reader.malformed_count(), 2);
    }

    #[test]
    fn test_empty_lines_ignored() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, b"\n\r\n\r\r\n\n");
        assert!(frames.is_empty());
        assert_eq!(reader.accepted_count(), 0);
        assert_eq!(reader.malformed_count(), 0);
    }

    #[test]
    fn test_unterminated_tail_not_emitted() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, b"{\"accX\":1.0000}\n{\"accX\":2.0");
        assert_eq!(accepted(&frames).len(), 1);
        assert_eq!(reader.pending_len(), 11);

        let frames = collect(&mut reader, b"000}\n");
        assert_eq!(accepted(&frames), vec![b"{\"accX\":2.0000}".to_vec()]);
        assert_eq!(reader.pending_len(), 0);
    }

    #[test]
    fn test_permissive_shape_check() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, b"{garbage}\n{}\n");
        assert_eq!(accepted(&frames), vec![b"{garbage}".to_vec(), b"{}".to_vec()]);
        match &frames[0] {
            Frame::Accepted(r) => assert_eq!(r.len(), 9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_chunking_is_idempotent() {
        let stream: &[u8] = b"boot banner\r\n{\"a\":1}\r\n\r\n{bad\n{\"b\":2}\r{\"c\":3}\n}\n{tail";

        let mut whole = FrameReader::new();
        let whole_frames = collect(&mut whole, stream);

        let mut single = FrameReader::new();
        let mut single_frames = Vec::new();
        for byte in stream {
            single_frames.extend(collect(&mut single, std::slice::from_ref(byte)));
        }

        let mut odd = FrameReader::new();
        let mut odd_frames = Vec::new();
        for chunk in stream.chunks(7) {
            odd_frames.extend(collect(&mut odd, chunk));
            odd_frames.extend(collect(&mut odd, &[]));
        }

        assert_eq!(whole_frames, single_frames);
        assert_eq!(whole_frames, odd_frames);
        assert_eq!(whole.accepted_count(), 3);
        assert_eq!(single.accepted_count(), 3);
        assert_eq!(odd.malformed_count(), whole.malformed_count());
        assert_eq!(odd.pending_len(), 5);
    }

    #[test]
    fn test_record_text_lossy() {
        let mut reader = FrameReader::new();
        let frames = collect(&mut reader, b"{\xff}\n");
        match &frames[0] {
            Frame::Accepted(r) => assert_eq!(r.text(), "{\u{FFFD}}"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
