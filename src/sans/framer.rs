//! Reassembly of complete lines from arbitrarily aligned chunks.

use std::collections::VecDeque;

/// Line terminator used by the receiver.
const TERMINATOR: u8 = b'\n';

/// Buffers chunks of a byte stream and yields complete, newline-terminated
/// lines in arrival order.
///
/// A line spanning any number of chunks is held back until its terminator
/// arrives. Nothing is ever dropped or reordered.
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Complete lines, each ending with the terminator.
    lines: VecDeque<String>,
    /// Bytes of the line currently in progress.
    partial: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of the stream.
    ///
    /// Empty chunks are accepted and change nothing. Bytes are decoded to text
    /// only once their line is complete, so a multi-byte character split across
    /// chunks survives intact.
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) {
        for piece in chunk.as_ref().split_inclusive(|b| *b == TERMINATOR) {
            self.partial.extend_from_slice(piece);

            if piece.last() == Some(&TERMINATOR) {
                let line = String::from_utf8_lossy(&self.partial).into_owned();
                self.lines.push_back(line);
                self.partial.clear();
            }
        }
    }

    /// Whether a complete line is available.
    pub fn has_next(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Remove and return the oldest complete line, including its terminator.
    ///
    /// Returns `None` when only an unterminated line (or nothing) is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// Number of bytes held for the line currently in progress.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }
}

impl Iterator for LineFramer {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
