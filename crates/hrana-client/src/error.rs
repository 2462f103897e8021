//! Client error types.

use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with a non-2xx HTTP status. The body is not parsed.
    #[error("HTTP error: status {status}")]
    Transport {
        /// HTTP status code.
        status: u16,
    },

    /// The HTTP exchange itself failed (connect, TLS, I/O).
    #[error("HTTP request failed")]
    Http(#[source] reqwest::Error),

    /// The request did not complete before its deadline.
    #[error("request timed out")]
    RequestTimeout,

    /// Malformed or unexpected protocol message.
    #[error("protocol error: {0}")]
    Protocol(#[from] hrana_protocol::ProtocolError),

    /// The server rejected a statement.
    #[error("statement error: {message}")]
    Statement {
        /// Server error message.
        message: String,
        /// Server error code (e.g. `SQLITE_CONSTRAINT`), if provided.
        code: Option<String>,
    },

    /// A batch step failed.
    #[error("batch step {step} failed: {message}")]
    Batch {
        /// Index of the lowest failed step.
        step: u32,
        /// Server error message.
        message: String,
        /// Server error code, if provided.
        code: Option<String>,
    },

    /// Type conversion error.
    #[error("type error: {0}")]
    Type(#[from] hrana_types::TypeError),

    /// Operation not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The stream was closed.
    #[error("stream closed")]
    StreamClosed,

    /// The connection was closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Query produced something other than a result set.
    #[error("query error: {0}")]
    Query(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn statement(error: hrana_protocol::ServerError) -> Self {
        Self::Statement {
            message: error.message,
            code: error.code,
        }
    }

    /// Check if this error is transient and may succeed on retry.
    ///
    /// Transient errors include timeouts, failed HTTP exchanges, throttling
    /// and server-side HTTP failures. A request `reqwest` refused to build is
    /// not transient. Nothing is retried automatically.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestTimeout => true,
            Self::Http(err) => !err.is_builder(),
            Self::Transport { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if this error indicates a protocol/driver bug.
    ///
    /// Protocol errors typically indicate a bug in the client or server
    /// implementation rather than a user error.
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// Check if the outcome of the request is unknown.
    ///
    /// A timed-out statement may or may not have been applied by the server.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::RequestTimeout)
    }

    /// Get the server error code, if this is a statement or batch error.
    #[must_use]
    pub fn server_code(&self) -> Option<&str> {
        match self {
            Self::Statement { code, .. } | Self::Batch { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
