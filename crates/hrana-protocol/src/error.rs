//! Protocol error types.

use thiserror::Error;

/// Errors raised while encoding or decoding Hrana protobuf messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The body is not valid protobuf for the expected message.
    #[error("malformed message: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A required field or oneof was absent.
    #[error("missing field {0}")]
    MissingField(&'static str),

    /// A stream request carried a kind this crate does not handle.
    #[error("unsupported stream request kind {0}")]
    UnknownRequestKind(u32),

    /// The response carried a different number of results than requests sent.
    #[error("expected {expected} stream results, got {actual}")]
    UnexpectedResultCount {
        /// Number of sub-requests sent.
        expected: usize,
        /// Number of results received.
        actual: usize,
    },

    /// The response payload kind did not match the request kind.
    #[error("expected {expected} response, got {actual}")]
    UnexpectedResponse {
        /// Response kind matching the request.
        expected: &'static str,
        /// Response kind actually received.
        actual: &'static str,
    },
}
