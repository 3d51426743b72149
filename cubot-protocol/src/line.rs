//! Line framing for the command protocol.
//!
//! Line format:
//! - TEXT (1-128 bytes): printable ASCII, words separated by single spaces
//! - TERMINATOR: `\n` or `\r` (the host answers with `\n\r`, the hub sends `\n`)
//!
//! Empty lines produced by paired terminators are skipped.

use heapless::{String, Vec};

/// Maximum line length in bytes, excluding the terminator
///
/// The longest legal line is `OK <move string>`; a solver answer stays well
/// under 30 moves of at most 3 characters each.
pub const MAX_LINE_LEN: usize = 128;

/// A complete received line, terminator stripped
pub type Line = String<MAX_LINE_LEN>;

/// Errors that can occur while splitting a byte stream into lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded `MAX_LINE_LEN`; bytes are dropped until the next terminator
    Overflow,
    /// Line contained bytes that are not valid UTF-8
    InvalidUtf8,
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineError::Overflow => write!(f, "line longer than {} bytes", MAX_LINE_LEN),
            LineError::InvalidUtf8 => write!(f, "line is not valid UTF-8"),
        }
    }
}

/// Returns true for the bytes that end a line
fn is_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// State machine for splitting incoming bytes into lines
#[derive(Debug, Clone)]
pub struct LineParser {
    state: ParseState,
    buffer: Vec<u8, MAX_LINE_LEN>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Collecting bytes of the current line
    Collecting,
    /// Dropping the tail of an overlong line
    Discarding,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Create a new line parser
    pub fn new() -> Self {
        Self {
            state: ParseState::Collecting,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state, dropping any partial line
    pub fn reset(&mut self) {
        self.state = ParseState::Collecting;
        self.buffer.clear();
    }

    /// Check if a partial line is buffered
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-empty line,
    /// `Ok(None)` when more bytes are needed, or `Err` when the current line
    /// has to be dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match self.state {
            ParseState::Discarding => {
                if is_terminator(byte) {
                    self.state = ParseState::Collecting;
                }
                Ok(None)
            }
            ParseState::Collecting => {
                if is_terminator(byte) {
                    return self.finish();
                }
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = ParseState::Discarding;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete line found, if any.
    /// Remaining bytes after a complete line are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Line>, LineError> {
        for &byte in bytes {
            if let Some(line) = self.feed(byte)? {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    fn finish(&mut self) -> Result<Option<Line>, LineError> {
        let result = match core::str::from_utf8(&self.buffer) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Ok(None)
                } else {
                    let mut line = Line::new();
                    // Cannot overflow: the text came out of a buffer of the same capacity
                    let _ = line.push_str(text);
                    Ok(Some(line))
                }
            }
            Err(_) => Err(LineError::InvalidUtf8),
        };
        self.buffer.clear();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut parser = LineParser::new();
        let line = parser.feed_bytes(b"OK\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "OK");
        assert!(!parser.has_partial());
    }

    #[test]
    fn test_carriage_return_pairs_are_skipped() {
        // The camera host terminates its answers with "\n\r"
        let mut parser = LineParser::new();
        let mut lines: Vec<Line, 4> = Vec::new();
        for &byte in b"OK\n\rERROR\n\r".iter() {
            if let Some(line) = parser.feed(byte).unwrap() {
                lines.push(line).unwrap();
            }
        }
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].as_str(), "OK");
        assert_eq!(lines[1].as_str(), "ERROR");
    }

    #[test]
    fn test_partial_line_waits_for_terminator() {
        let mut parser = LineParser::new();
        assert_eq!(parser.feed_bytes(b"IMAGE ").unwrap(), None);
        assert!(parser.has_partial());
        let line = parser.feed_bytes(b"L\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "IMAGE L");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let mut parser = LineParser::new();
        let line = parser.feed_bytes(b"  OK R U  \n").unwrap().unwrap();
        assert_eq!(line.as_str(), "OK R U");
        assert_eq!(parser.feed_bytes(b"   \n").unwrap(), None);
    }

    #[test]
    fn test_overflow_resyncs_at_next_terminator() {
        let mut parser = LineParser::new();
        let long = [b'A'; MAX_LINE_LEN + 1];
        assert_eq!(parser.feed_bytes(&long), Err(LineError::Overflow));

        // Tail of the overlong line is dropped
        assert_eq!(parser.feed_bytes(b"AAAA").unwrap(), None);
        assert_eq!(parser.feed_bytes(b"\n").unwrap(), None);

        let line = parser.feed_bytes(b"OK\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "OK");
    }

    #[test]
    fn test_invalid_utf8() {
        let mut parser = LineParser::new();
        assert_eq!(
            parser.feed_bytes(&[0xFF, 0xFE, b'\n']),
            Err(LineError::InvalidUtf8)
        );
        let line = parser.feed_bytes(b"OK\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "OK");
    }

    proptest::proptest! {
        #[test]
        fn prop_lines_never_carry_terminators(bytes in proptest::collection::vec(proptest::num::u8::ANY, 0..512)) {
            let mut parser = LineParser::new();
            for byte in bytes {
                if let Ok(Some(line)) = parser.feed(byte) {
                    proptest::prop_assert!(!line.is_empty());
                    proptest::prop_assert!(line.len() <= MAX_LINE_LEN);
                    proptest::prop_assert!(!line.contains('\n') && !line.contains('\r'));
                }
            }
        }
    }

    #[test]
    fn test_reset_drops_partial_line() {
        let mut parser = LineParser::new();
        parser.feed_bytes(b"GARB").unwrap();
        parser.reset();
        let line = parser.feed_bytes(b"OK\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "OK");
    }
}
