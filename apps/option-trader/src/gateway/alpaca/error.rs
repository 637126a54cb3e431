//! Alpaca-specific error types.

use thiserror::Error;

use crate::error::ClientError;

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone)]
pub enum AlpacaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// API returned an error payload.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Order was rejected.
    #[error("order rejected: {0}")]
    OrderRejected(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Required credential environment variable is unset.
    #[error("missing credential: {0}")]
    MissingCredentials(&'static str),

    /// Rate limited.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Network error (retryable).
    #[error("network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// Order not found.
    #[error("order not found: {order_id}")]
    OrderNotFound {
        /// The order id that was not found.
        order_id: String,
    },
}

impl From<AlpacaError> for ClientError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(msg) | AlpacaError::Network(msg) | AlpacaError::JsonParse(msg) => {
                Self::Transport(msg)
            }
            AlpacaError::RateLimited { retry_after_secs } => {
                Self::Transport(format!("rate limited, retry after {retry_after_secs}s"))
            }
            AlpacaError::MaxRetriesExceeded { attempts } => {
                Self::Transport(format!("max retries exceeded after {attempts} attempts"))
            }
            AlpacaError::OrderRejected(msg) => Self::BrokerRejection(msg),
            AlpacaError::Api { code, message } => {
                Self::BrokerRejection(format!("{code}: {message}"))
            }
            AlpacaError::OrderNotFound { order_id } => {
                Self::BrokerRejection(format!("order not found: {order_id}"))
            }
            AlpacaError::AuthenticationFailed => {
                Self::Validation("authentication failed, check API credentials".to_string())
            }
            AlpacaError::MissingCredentials(var) => {
                Self::Validation(format!("missing credential: {var}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_map_to_transport() {
        let err: ClientError = AlpacaError::Network("connection reset".into()).into();
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn rejections_map_to_broker_rejection() {
        let err: ClientError = AlpacaError::OrderRejected("insufficient buying power".into()).into();
        assert!(matches!(err, ClientError::BrokerRejection(_)));
    }
}
