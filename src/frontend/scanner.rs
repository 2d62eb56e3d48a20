//! Buffered byte scanner over an arbitrary `Read` source.
//!
//! The scanner owns a fixed-size buffer and refills it only when it is
//! completely drained. `read_bytes_in_class` hands out borrows into that
//! buffer, valid until the next scanner call; callers copy what they keep.
//! Line and column tracking lives here so every stage above works with
//! ready-made positions.

use std::io::Read;

use crate::frontend::byte_class::ByteClass;
use crate::frontend::position::Position;

pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Failure surfaced by scanner reads. End of input is its own variant so
/// the tokenizer can turn it into an EOF token instead of a diagnostic.
#[derive(Debug)]
pub enum ScanError {
    Eof,
    Io(std::io::Error),
}

pub struct Scanner<R> {
    reader: R,
    buff: Vec<u8>,
    pos: usize,
    max: usize,
    line: usize,
    column: usize,
}

impl<R: Read> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_buffer_size(reader, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(reader: R, buffer_size: usize) -> Self {
        let buffer_size = if buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            buffer_size
        };
        // pos == max == len forces a refill on first access instead of
        // reading in the constructor.
        Self {
            reader,
            buff: vec![0; buffer_size],
            pos: buffer_size,
            max: buffer_size,
            line: 1,
            column: 1,
        }
    }

    /// Position of the next unconsumed byte, 1-based.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn remaining(&self) -> usize {
        self.max - self.pos
    }

    fn fill_buffer(&mut self) -> Result<(), ScanError> {
        // Refilling a buffer that still holds data would force compaction
        // and could silently discard bytes. Callers drain first.
        assert!(self.remaining() == 0, "filling a non-empty scanner buffer");

        let n = self.reader.read(&mut self.buff).map_err(ScanError::Io)?;
        if n == 0 {
            return Err(ScanError::Eof);
        }

        self.pos = 0;
        self.max = n;
        Ok(())
    }

    /// Next byte without consuming it.
    pub fn peek_one(&mut self) -> Result<u8, ScanError> {
        if self.remaining() == 0 {
            self.fill_buffer()?;
        }
        Ok(self.buff[self.pos])
    }

    /// Consumes and returns the next byte, updating (line, column).
    pub fn read_one(&mut self) -> Result<u8, ScanError> {
        let b = self.peek_one()?;
        self.pos += 1;
        self.advance_position(b);
        Ok(b)
    }

    /// Consumes the already-peeked byte without touching the reader.
    ///
    /// Panics if the buffer is empty; callers must have peeked first.
    pub fn pop_one_from_buffer(&mut self) -> u8 {
        assert!(self.remaining() > 0, "pop from an empty scanner buffer");
        let b = self.buff[self.pos];
        self.pos += 1;
        self.advance_position(b);
        b
    }

    /// Reads the maximal prefix of buffered bytes lying in `cls`.
    ///
    /// Returns the matched slice and an `is_partial` flag that is true iff
    /// the run reached the end of the buffered window; the caller must
    /// call again to continue the run. The slice borrows the scanner's
    /// buffer and is invalidated by the next scanner call. When nothing
    /// matches, the slice is empty and `is_partial` is false.
    pub fn read_bytes_in_class(&mut self, cls: &ByteClass) -> Result<(&[u8], bool), ScanError> {
        if self.remaining() == 0 {
            self.fill_buffer()?;
        }

        let start = self.pos;
        let mut end = start;
        while end < self.max && cls.contains(self.buff[end]) {
            end += 1;
        }

        if end == start {
            return Ok((&[], false));
        }

        self.pos = end;
        for i in start..end {
            let b = self.buff[i];
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }

        let is_partial = end == self.max;
        Ok((&self.buff[start..end], is_partial))
    }

    fn advance_position(&mut self, consumed: u8) {
        if consumed == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}
