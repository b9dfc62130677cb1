//! Error types for dyncodec encode and decode operations.

use thiserror::Error;

/// Error raised by a single serialize or deserialize call.
///
/// A failure aborts only the in-flight operation. Any partially produced
/// buffer or partially populated instance must be discarded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The output buffer could not grow to hold the encoded message.
    #[error("allocation failure: could not reserve {requested} more bytes")]
    AllocationFailure {
        /// Number of additional bytes requested.
        requested: usize,
    },

    /// The input ended before a read could be satisfied.
    #[error("truncated input at offset {offset}: required {required} bytes, remaining {remaining}")]
    TruncatedInput {
        /// Byte offset where the read was attempted.
        offset: usize,
        /// Bytes the read needed.
        required: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// An element count exceeds the declared or configured maximum.
    #[error("array bound exceeded for field '{field}': count {count}, maximum {max}")]
    ArrayBoundExceeded {
        /// Field name.
        field: String,
        /// Count found in the instance or on the wire.
        count: usize,
        /// Permitted maximum.
        max: usize,
    },

    /// Nested messages go deeper than the configured ceiling.
    #[error("recursion limit exceeded: depth {depth}, limit {limit}")]
    RecursionLimitExceeded {
        /// Depth that was reached.
        depth: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// Instance storage does not match the schema it is used with.
    #[error("layout mismatch: {message}")]
    LayoutMismatch {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates an array bound error.
    pub fn bound_exceeded(field: impl Into<String>, count: usize, max: usize) -> Self {
        Self::ArrayBoundExceeded {
            field: field.into(),
            count,
            max,
        }
    }

    /// Creates a layout mismatch error.
    pub fn layout(message: impl Into<String>) -> Self {
        Self::LayoutMismatch {
            message: message.into(),
        }
    }
}

/// Result type alias for dyncodec codec operations.
pub type Result<T> = std::result::Result<T, Error>;
