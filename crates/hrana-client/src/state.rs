//! Stream lifecycle states.
//!
//! ## State Transitions
//!
//! ```text
//! Fresh -> Active (first baton received)
//! Fresh -> Closed (close(), no network call)
//! Active -> Closed (close(), one close request)
//! ```
//!
//! A closed stream never reopens. Unlike a type-state connection, a stream
//! tracks its state at runtime because `close()` must succeed from any state.

/// Lifecycle state of a [`crate::Stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// The server has not handed out a baton yet.
    #[default]
    Fresh,
    /// The stream holds a baton, so server-side state may exist.
    Active,
    /// The stream was closed; all further operations fail.
    Closed,
}

impl StreamState {
    /// Check if the stream accepts operations.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Name of the state, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}
