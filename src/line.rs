use crate::error::{unexpected_eof, TurtleParseError, TurtleSyntaxError};
use crate::MAX_LINE_SIZE;
use memchr::memchr;
use std::io::BufRead;
use std::mem;

/// Line-buffered view over the input stream.
///
/// `line` holds the current physical line (UTF-8 checked, trailing `\n`
/// included when present) and `pos` the cursor into it; `line[pos..]` is
/// the pending unparsed tail. Physical lines longer than
/// [`MAX_LINE_SIZE`] are rejected.
pub(crate) struct LineCursor<R> {
    read: R,
    pub(crate) line: String,
    pub(crate) pos: usize,
    line_no: u64,
}

impl<R: BufRead> LineCursor<R> {
    pub(crate) fn new(read: R) -> Self {
        Self {
            read,
            line: String::new(),
            pos: 0,
            line_no: 0,
        }
    }

    /// The 1-based number of the current physical line.
    pub(crate) fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Builds a syntax error at the current line.
    pub(crate) fn syntax(&self, message: impl Into<String>) -> TurtleSyntaxError {
        TurtleSyntaxError::new(self.line_no, message)
    }

    /// The byte under the cursor, if the current line has one left.
    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.line.as_bytes().get(self.pos).copied()
    }

    /// Replaces the current line with the next physical line, verbatim.
    ///
    /// Returns `false` on a clean end of stream. A final line without a
    /// newline terminator counts as a line.
    pub(crate) fn fill_raw(&mut self) -> Result<bool, TurtleParseError> {
        let mut buf = mem::take(&mut self.line).into_bytes();
        buf.clear();
        self.pos = 0;
        loop {
            let available = self.read.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let (used, complete) = match memchr(b'\n', available) {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            buf.extend_from_slice(&available[..used]);
            self.read.consume(used);
            if buf.len() > MAX_LINE_SIZE {
                return Err(TurtleSyntaxError::new(self.line_no() + 1, "line too long").into());
            }
            if complete {
                break;
            }
        }
        if buf.is_empty() {
            return Ok(false);
        }
        self.line_no += 1;
        match String::from_utf8(buf) {
            Ok(line) => {
                self.line = line;
                Ok(true)
            }
            Err(_) => Err(self.syntax("invalid UTF-8").into()),
        }
    }

    /// Like [`fill_raw`](Self::fill_raw) but the stream must not end here.
    /// Used for the continuation lines of an open long literal.
    pub(crate) fn expect_raw_line(&mut self, context: &str) -> Result<(), TurtleParseError> {
        if self.fill_raw()? {
            Ok(())
        } else {
            Err(unexpected_eof(context).into())
        }
    }

    /// Moves the cursor forward within the current line until it sits on a
    /// token byte. A `#` starts a comment tail that exhausts the line.
    fn skip_in_line(&mut self) -> bool {
        let bytes = self.line.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'#' | b'\n' => {
                    self.pos = bytes.len();
                    return false;
                }
                _ => return true,
            }
        }
        false
    }

    /// Positions the cursor on the next token, reading further lines as
    /// needed. Returns `false` on a clean end of stream.
    pub(crate) fn next_token(&mut self) -> Result<bool, TurtleParseError> {
        loop {
            if self.skip_in_line() {
                return Ok(true);
            }
            if !self.fill_raw()? {
                return Ok(false);
            }
        }
    }

    /// Like [`next_token`](Self::next_token) but mid-statement, where the
    /// grammar requires more input: a clean end of stream is unexpected.
    pub(crate) fn expect_token(&mut self, context: &str) -> Result<(), TurtleParseError> {
        if self.next_token()? {
            Ok(())
        } else {
            Err(unexpected_eof(context).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn cursor(input: &[u8]) -> LineCursor<&[u8]> {
        LineCursor::new(input)
    }

    #[test]
    fn skips_blank_lines_and_comments() -> Result<(), TurtleParseError> {
        let mut c = cursor(b"\n\t \r\n# full-line comment\n  token # tail\n");
        assert!(c.next_token()?);
        assert_eq!(c.peek(), Some(b't'));
        assert_eq!(c.line_no(), 4);
        c.pos += "token".len();
        assert!(!c.next_token()?); // the tail is only a comment
        Ok(())
    }

    #[test]
    fn counts_lines() -> Result<(), TurtleParseError> {
        let mut c = cursor(b"a\nb\nc");
        for (no, token) in [(1u64, b'a'), (2, b'b'), (3, b'c')] {
            assert!(c.next_token()?);
            assert_eq!(c.peek(), Some(token));
            assert_eq!(c.line_no(), no);
            c.pos += 1;
        }
        assert!(!c.next_token()?);
        Ok(())
    }

    #[test]
    fn unexpected_eof_mid_statement() {
        let mut c = cursor(b"a\n");
        assert!(c.next_token().unwrap());
        c.pos += 1;
        let err = c.expect_token("statement not terminated").unwrap_err();
        match err {
            TurtleParseError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            TurtleParseError::Syntax(e) => panic!("unexpected syntax error: {e}"),
        }
    }

    #[test]
    fn rejects_overlong_line() {
        let mut input = vec![b'x'; MAX_LINE_SIZE + 1];
        input.push(b'\n');
        let mut c = LineCursor::new(input.as_slice());
        let err = c.next_token().unwrap_err();
        assert_eq!(err.to_string(), "Turtle syntax violation on line 1: line too long");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut c = cursor(b"<http://example.com/\xff> <p> <o> .\n");
        let err = c.next_token().unwrap_err();
        assert_eq!(err.to_string(), "Turtle syntax violation on line 1: invalid UTF-8");
    }
}
