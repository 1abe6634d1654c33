//! Error types for the bibnorm crate

use std::fmt;
use thiserror::Error;

/// Result type for bibnorm operations
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for bibnorm
///
/// Classification, normalization and serialization never produce one of
/// these; they only come out of reading input, field access by name and
/// configuration loading.
#[derive(Error, Debug)]
pub enum Error {
    /// Parse error with location information
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
        /// Error message
        message: String,
        /// Optional source snippet
        snippet: Option<String>,
    },

    /// Undefined string variable
    #[error("Undefined string variable '{0}'")]
    UndefinedVariable(String),

    /// Invalid entry type
    #[error("Invalid entry type '{0}'")]
    InvalidEntryType(String),

    /// Field name that is neither a bibliographic attribute nor a known extra
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// The input held a different number of records than the operation needs
    #[error("Expected exactly one record, found {0}")]
    UnexpectedRecordCount(usize),

    /// The producer side of the input pipe could not be started or died
    #[error("Input pipe failed: {0}")]
    Pipe(#[source] std::io::Error),

    /// Malformed configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic parse error from winnow
    #[error("Parse error: {0}")]
    WinnowError(String),
}

/// Convert winnow errors to our error type
impl From<winnow::error::ContextError> for Error {
    fn from(err: winnow::error::ContextError) -> Self {
        Self::WinnowError(err.to_string())
    }
}

/// Location information for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Location {
    /// Compute the location of a byte offset in `input`
    #[must_use]
    pub fn of_offset(input: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;

        for (i, ch) in input.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
