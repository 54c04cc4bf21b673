//! Pagination errors

use thiserror::Error;

/// Errors raised while decoding cursors or assembling pages
#[derive(Error, Debug)]
pub enum PaginationError {
    /// The opaque cursor supplied by the client could not be decoded
    #[error("Invalid pagination cursor")]
    InvalidCursor,

    /// The requested page size is not a positive integer
    #[error("Page limit must be a positive integer")]
    InvalidLimit,

    /// A cursor extracted from the last item of a page is not well-formed.
    /// Points at a data-integrity or query bug, never at the client.
    #[error("Cursor value for {ordering} ordering is invalid: {reason}")]
    InvalidCursorValue {
        ordering: &'static str,
        reason: &'static str,
    },

    /// A validated cursor value failed to serialize
    #[error("Failed to encode cursor: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PaginationError {
    /// Whether the error was caused by client input (cursor or limit)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCursor | Self::InvalidLimit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(PaginationError::InvalidCursor.is_client_error());
        assert!(PaginationError::InvalidLimit.is_client_error());
        assert!(
            !PaginationError::InvalidCursorValue {
                ordering: "time_desc",
                reason: "missing id",
            }
            .is_client_error()
        );
    }
}
