//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding, decoding or reading statements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The statement stream contains bytes that are not valid UTF-8.
    ///
    /// This is fatal for the whole stream: no replacement characters are
    /// ever substituted.
    #[error("invalid UTF-8 in statement stream at line {line}")]
    InvalidEncoding {
        /// 1-based physical line number.
        line: u64,
    },

    /// A statement does not start with a known verb.
    #[error("unknown statement at line {line}: {snippet}")]
    UnknownStatement {
        /// 1-based line on which the statement started.
        line: u64,
        /// Leading text of the offending statement.
        snippet: String,
    },

    /// The stream ended while deletes were still waiting for their inserts.
    #[error("stream ended with {count} delete statement(s) that have no paired insert")]
    UnpairedDelete {
        /// Number of held delete statements.
        count: usize,
    },

    /// The stream ended in the middle of a statement.
    #[error("stream ended inside a statement starting at line {line}")]
    Truncated {
        /// 1-based line on which the unfinished statement started.
        line: u64,
    },

    /// Reading the underlying stream failed.
    #[error("I/O error while reading statements: {0}")]
    Io(String),

    /// A URI cannot be written between angle brackets.
    #[error("invalid URI {uri:?}: {reason}")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Statement text could not be parsed.
    #[error("malformed statement at offset {offset}: {message}")]
    Malformed {
        /// Byte offset in the statement text.
        offset: usize,
        /// Description of the problem.
        message: String,
    },
}

impl CodecError {
    /// Create a malformed statement error.
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            message: message.into(),
        }
    }

    /// Returns true if the error makes the rest of the stream unreadable.
    pub fn is_fatal_for_stream(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidEncoding { .. } | CodecError::Io(_) | CodecError::Truncated { .. }
        )
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}
