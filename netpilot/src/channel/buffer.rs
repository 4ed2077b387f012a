//! Pattern buffer with tail-search optimization.
//!
//! Only the last `search_depth` bytes are searched for prompt patterns, so
//! large outputs (full configurations, routing tables) stay cheap to scan.

use bytes::BytesMut;
use regex::bytes::Regex;

/// Buffer for accumulating shell output and searching its tail for prompts.
pub struct PatternBuffer {
    /// The accumulated, ANSI-stripped output.
    buffer: BytesMut,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Escape-sequence parser; state carries over between chunks.
    parser: vte::Parser,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            parser: vte::Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let mut printable = Printable(&mut self.buffer);
        self.parser.advance(&mut printable, data);
    }

    /// Find the last match of `pattern` in the tail that is followed only by
    /// whitespace, i.e. a prompt sitting at the end of the output.
    ///
    /// Returns absolute `(start, end)` offsets.
    pub fn find_trailing(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        let tail = &self.buffer[start..];
        let m = pattern.find_iter(tail).last()?;
        if tail[m.end()..].iter().all(u8::is_ascii_whitespace) {
            Some((start + m.start(), start + m.end()))
        } else {
            None
        }
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Keeps printable characters and line control, drops escape sequences.
struct Printable<'a>(&'a mut BytesMut);

impl vte::Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.0.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.0.extend_from_slice(&[byte]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_slice(), b"Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mGreen text\x1b[0m\r\n");
        assert_eq!(buffer.as_slice(), b"Green text\r\n");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"A:router# \x1b[");
        buffer.extend(b"0m");
        assert_eq!(buffer.as_slice(), b"A:router# ");
    }

    #[test]
    fn test_trailing_prompt_found() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nrouter#");

        let pattern = Regex::new(r"(?m)^router#\s?$").unwrap();
        let (start, end) = buffer.find_trailing(&pattern).unwrap();
        assert_eq!(&buffer.as_slice()[start..end], b"router#");
    }

    #[test]
    fn test_prompt_outside_tail_ignored() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"router#\n");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"(?m)^router#\s?$").unwrap();
        assert!(buffer.find_trailing(&pattern).is_none());
    }

    #[test]
    fn test_prompt_mid_output_ignored() {
        let mut buffer = PatternBuffer::new(1000);
        buffer.extend(b"router#\r\nmore output still coming");

        let pattern = Regex::new(r"(?m)^router#\s?$").unwrap();
        assert!(buffer.find_trailing(&pattern).is_none());
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), b"test data");
        assert!(buffer.is_empty());
    }
}
