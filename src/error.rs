use std::io;

/// An error in the syntax of the parsed Turtle document.
///
/// It is composed of the 1-based number of the physical input line the
/// parser was on when it diverged and a human-readable reason.
#[derive(Debug, thiserror::Error)]
#[error("Turtle syntax violation on line {line_no}: {message}")]
pub struct TurtleSyntaxError {
    line_no: u64,
    message: String,
}

impl TurtleSyntaxError {
    pub(crate) fn new(line_no: u64, message: impl Into<String>) -> Self {
        Self {
            line_no,
            message: message.into(),
        }
    }

    /// The 1-based physical line the error was detected on.
    #[inline]
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TurtleSyntaxError> for io::Error {
    #[inline]
    fn from(error: TurtleSyntaxError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// A parsing error.
///
/// It is the union of [`TurtleSyntaxError`] and [`io::Error`]. Stream
/// errors from the underlying reader pass through unchanged; an incomplete
/// statement at the end of the stream surfaces as an [`io::Error`] of kind
/// [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug, thiserror::Error)]
pub enum TurtleParseError {
    /// I/O error during parsing (file not found...).
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error in the file syntax.
    #[error(transparent)]
    Syntax(#[from] TurtleSyntaxError),
}

impl From<TurtleParseError> for io::Error {
    #[inline]
    fn from(error: TurtleParseError) -> Self {
        match error {
            TurtleParseError::Syntax(e) => e.into(),
            TurtleParseError::Io(e) => e,
        }
    }
}

/// Builds the error used when the stream ends in the middle of a statement.
pub(crate) fn unexpected_eof(context: &str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, context.to_owned())
}
