//! # Line input
//!
//! Inbound command lines are captured into a fixed size buffer and split into whitespace
//! separated tokens. Tokens are stored as spans relative to the start of their own buffer, so
//! copying a line into another [`TokenizedLine`] keeps every token valid without any fix up of
//! the source.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::{MAX_ARGS, MAX_LINE_LEN};
use log::{trace, warn};

use crate::transport::{Transport, TransportError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of payload bytes in one line, one byte of the buffer is reserved.
pub const MAX_PAYLOAD_LEN: usize = MAX_LINE_LEN - 1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A line of input and the spans of its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizedLine {
    buf: [u8; MAX_LINE_LEN],

    len: usize,

    /// `(start, end)` byte offsets into `buf`
    spans: [(usize, usize); MAX_ARGS],

    count: usize,
}

/// Captures lines from a transport and holds the latest one until it is consumed.
#[derive(Debug, Default)]
pub struct LineTokenizer {
    line: TokenizedLine,

    available: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TokenizedLine {
    pub fn new() -> Self {
        Self {
            buf: [0; MAX_LINE_LEN],
            len: 0,
            spans: [(0, 0); MAX_ARGS],
            count: 0,
        }
    }

    /// Build a tokenized line from text, truncated to [`MAX_PAYLOAD_LEN`] bytes.
    pub fn from_text(text: &str) -> Self {
        let mut line = Self::new();
        line.parse(text.as_bytes());
        line
    }

    /// Replace the contents of this line with `bytes` and tokenize them.
    ///
    /// Returns `true` if the line held more than [`MAX_ARGS`] tokens and the excess was dropped.
    pub fn parse(&mut self, bytes: &[u8]) -> bool {
        let len = bytes.len().min(MAX_PAYLOAD_LEN);

        self.buf = [0; MAX_LINE_LEN];
        self.buf[..len].copy_from_slice(&bytes[..len]);
        self.len = len;

        self.tokenize()
    }

    fn tokenize(&mut self) -> bool {
        self.count = 0;
        let mut dropped = false;

        let mut start: Option<usize> = None;

        for i in 0..=self.len {
            // The end of the payload acts as a final separator
            let is_sep = i == self.len || self.buf[i].is_ascii_whitespace();

            match (start, is_sep) {
                (None, false) => start = Some(i),
                (Some(s), true) => {
                    if self.count < MAX_ARGS {
                        self.spans[self.count] = (s, i);
                        self.count += 1;
                    } else {
                        dropped = true;
                    }
                    start = None;
                }
                _ => (),
            }
        }

        dropped
    }

    /// Number of tokens in the line, never more than [`MAX_ARGS`].
    pub fn argument_count(&self) -> usize {
        self.count
    }

    /// The `i`th token, or `None` if there is no such token or it is not valid UTF-8.
    pub fn argument(&self, i: usize) -> Option<&str> {
        if i >= self.count {
            return None;
        }

        let (start, end) = self.spans[i];
        std::str::from_utf8(&self.buf[start..end]).ok()
    }

    /// The raw payload of the line.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Deep copy this line into `dest`.
    pub fn copy_into(&self, dest: &mut TokenizedLine) {
        dest.buf = self.buf;
        dest.len = self.len;
        dest.count = self.count;
        // Spans are buffer relative so they apply to `dest.buf` unchanged
        dest.spans = self.spans;
    }
}

impl Default for TokenizedLine {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull the next line from the transport if no line is pending.
    ///
    /// Never blocks. Returns `true` if a new line was captured.
    pub fn feed<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<bool, TransportError> {
        if self.available || !transport.bytes_available() {
            return Ok(false);
        }

        let mut raw = [0u8; MAX_PAYLOAD_LEN];
        let len = transport.read_line_into(&mut raw)?;

        let dropped = self.line.parse(&raw[..len]);
        self.available = true;

        if dropped {
            warn!("Line has more than {} tokens, the excess was dropped", MAX_ARGS);
        }
        trace!(
            "Captured line {:?} ({} tokens)",
            String::from_utf8_lossy(self.line.as_bytes()),
            self.line.argument_count()
        );

        Ok(true)
    }

    /// Tokenize a line directly, as if it had arrived from a transport.
    ///
    /// Ignored if a line is already pending.
    pub fn feed_text(&mut self, text: &str) -> bool {
        if self.available {
            return false;
        }

        self.line.parse(text.as_bytes());
        self.available = true;
        true
    }

    /// True once a full line has been tokenized and not yet consumed.
    pub fn available(&self) -> bool {
        self.available
    }

    pub fn argument_count(&self) -> usize {
        self.line.argument_count()
    }

    pub fn argument(&self, i: usize) -> Option<&str> {
        self.line.argument(i)
    }

    /// Release the pending line, allowing the next one to overwrite it.
    pub fn consume(&mut self) {
        self.available = false;
    }

    /// Deep copy the pending line into `dest`.
    pub fn copy_into(&self, dest: &mut TokenizedLine) {
        self.line.copy_into(dest);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::transport::MemTransport;

    #[test]
    fn test_tokenize_moveto() {
        let line = TokenizedLine::from_text("moveto 10 20 30 40 50 60");

        assert_eq!(line.argument_count(), 7);
        assert_eq!(line.argument(0), Some("moveto"));
        assert_eq!(line.argument(6), Some("60"));
        assert_eq!(line.argument(7), None);
    }

    #[test]
    fn test_separators() {
        let line = TokenizedLine::from_text("  freeze\t\t500 \r");

        assert_eq!(line.argument_count(), 2);
        assert_eq!(line.argument(0), Some("freeze"));
        assert_eq!(line.argument(1), Some("500"));

        let blank = TokenizedLine::from_text(" \t\r");
        assert_eq!(blank.argument_count(), 0);
        assert_eq!(blank.argument(0), None);
    }

    #[test]
    fn test_excess_tokens_dropped() {
        let line = TokenizedLine::from_text("a b c d e f g h i j");

        assert_eq!(line.argument_count(), MAX_ARGS);
        assert_eq!(line.argument(7), Some("h"));
        assert_eq!(line.argument(8), None);
    }

    #[test]
    fn test_parse_reports_dropped_tokens() {
        let mut line = TokenizedLine::new();

        // A full movetimed line uses every slot without losing anything
        assert!(!line.parse(b"movetimed 1 2 3 4 5 6 700"));
        assert_eq!(line.argument_count(), MAX_ARGS);

        assert!(line.parse(b"movetimed 1 2 3 4 5 6 700 9"));
        assert_eq!(line.argument_count(), MAX_ARGS);
        assert_eq!(line.argument(7), Some("700"));

        // Trailing whitespace is not a token
        assert!(!line.parse(b"a b c d e f g h  \t"));
    }

    #[test]
    fn test_overlong_line_truncated() {
        let text = "x".repeat(100);
        let line = TokenizedLine::from_text(&text);

        assert_eq!(line.as_bytes().len(), MAX_PAYLOAD_LEN);
        assert_eq!(line.argument(0).map(str::len), Some(MAX_PAYLOAD_LEN));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut tok = LineTokenizer::new();
        let mut copy = TokenizedLine::new();

        assert!(tok.feed_text("moveto 1 2 3 4 5 6"));
        tok.copy_into(&mut copy);
        tok.consume();

        // Overwrite the source buffer with a new line
        assert!(tok.feed_text("freeze 100"));

        assert_eq!(copy.argument_count(), 7);
        assert_eq!(copy.argument(0), Some("moveto"));
        assert_eq!(copy.argument(3), Some("3"));
        assert_eq!(tok.argument(0), Some("freeze"));
    }

    #[test]
    fn test_feed_holds_pending_line() {
        let mut t = MemTransport::new();
        let mut tok = LineTokenizer::new();

        assert!(!tok.feed(&mut t).unwrap());
        assert!(!tok.available());

        t.push_line("stop");
        t.push_line("wait");

        assert!(tok.feed(&mut t).unwrap());
        assert!(tok.available());
        assert_eq!(tok.argument(0), Some("stop"));

        // Not consumed, so the second line stays in the transport
        assert!(!tok.feed(&mut t).unwrap());
        assert_eq!(tok.argument(0), Some("stop"));
        assert!(t.bytes_available());

        tok.consume();
        assert!(tok.feed(&mut t).unwrap());
        assert_eq!(tok.argument(0), Some("wait"));
    }

    #[test]
    fn test_feed_caps_read_length() {
        let mut t = MemTransport::new();
        let mut tok = LineTokenizer::new();

        t.push_line(&format!("moveto {}", "9".repeat(80)));
        t.push_line("stop");

        assert!(tok.feed(&mut t).unwrap());
        assert_eq!(tok.argument_count(), 2);
        assert_eq!(tok.argument(1).map(str::len), Some(MAX_PAYLOAD_LEN - 7));

        tok.consume();
        assert!(tok.feed(&mut t).unwrap());
        assert_eq!(tok.argument(0), Some("stop"));
    }
}
