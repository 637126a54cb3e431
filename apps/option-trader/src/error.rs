//! Client-wide error taxonomy.
//!
//! Failures during monitoring are caught at the point of the failing
//! call and reported to the user; only a user abort propagates past the
//! monitor loop.

use thiserror::Error;

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or HTTP failure. Retried on the next tick, never fatal to
    /// a monitoring session.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed user or symbol input. The operation aborts, the session
    /// continues.
    #[error("validation error: {0}")]
    Validation(String),

    /// Explicit error payload from the trading API, surfaced verbatim.
    #[error("broker rejection: {0}")]
    BrokerRejection(String),

    /// An operation was attempted against an order state that cannot
    /// accept it.
    #[error("order state conflict: {0}")]
    StateConflict(String),

    /// User-initiated abort of the session.
    #[error("interrupted by user")]
    Interrupted,

    /// Terminal or file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True if the next poll tick should simply retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
