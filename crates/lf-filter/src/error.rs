//! Error types for the payload scanner.

use thiserror::Error;

/// Result type for scanning operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a value could not be delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The buffer ended inside a quoted string.
    UnterminatedString,
    /// The buffer ended before an object or array was closed.
    UnbalancedGroup,
    /// A key was followed by a colon but no value.
    MissingValue,
    /// A delimiter appeared where a scalar token was expected.
    EmptyScalar,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MalformedReason::UnterminatedString => "unterminated string",
            MalformedReason::UnbalancedGroup => "unbalanced group",
            MalformedReason::MissingValue => "missing value",
            MalformedReason::EmptyScalar => "empty scalar",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised while scanning a payload.
///
/// These never escape `shorten`/`trim`: the affected occurrence is dropped
/// (extraction) or left untouched (redaction).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A value scan ran off the end of the buffer or hit a stray delimiter.
    #[error("malformed input at byte {offset}: {reason}")]
    MalformedInput {
        /// Offset where the offending value starts.
        offset: usize,
        /// What went wrong.
        reason: MalformedReason,
    },
}

impl ScanError {
    pub(crate) fn malformed(offset: usize, reason: MalformedReason) -> Self {
        ScanError::MalformedInput { offset, reason }
    }

    /// Offset where the offending value starts.
    pub fn offset(&self) -> usize {
        match self {
            ScanError::MalformedInput { offset, .. } => *offset,
        }
    }
}
