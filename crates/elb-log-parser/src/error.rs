//! Log line parsing error types.

use thiserror::Error;

/// Reasons a log line (or one of its fields) could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("unrecognized timestamp: {0:?}")]
    Timestamp(String),

    #[error("malformed request line: {0:?}")]
    Request(String),

    #[error("malformed URL: {0:?}")]
    Url(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ParseError {
    /// Whether this error rejects the whole line (as opposed to a single field).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::TooFewFields { .. } | Self::Timestamp(_) | Self::Internal(_)
        )
    }
}

/// Convenience alias for parsing results.
pub type ParseResult<T> = Result<T, ParseError>;
