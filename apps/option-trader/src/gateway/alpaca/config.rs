//! Alpaca adapter configuration.

use std::time::Duration;

use super::error::AlpacaError;

/// Environment for the Alpaca API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlpacaEnvironment {
    /// Paper trading (simulated).
    Paper,
    /// Live trading (real money).
    Live,
}

impl AlpacaEnvironment {
    /// Base URL for the trading API.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Base URL for the market data API.
    #[must_use]
    pub const fn data_base_url(&self) -> &'static str {
        "https://data.alpaca.markets"
    }

    /// WebSocket URL for the options quote stream.
    #[must_use]
    pub const fn options_stream_url(&self) -> &'static str {
        match self {
            Self::Paper => "wss://stream.data.sandbox.alpaca.markets/v1beta1/options",
            Self::Live => "wss://stream.data.alpaca.markets/v1beta1/options",
        }
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl std::fmt::Display for AlpacaEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Configuration for the Alpaca adapter.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Trading environment.
    pub environment: AlpacaEnvironment,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy configuration.
    pub retry: RetryConfig,
}

impl AlpacaConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(api_key: String, api_secret: String, environment: AlpacaEnvironment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// Create configuration from `ALPACA_KEY` / `ALPACA_SECRET` /
    /// `ALPACA_ENV` environment variables. `ALPACA_ENV` defaults to
    /// PAPER; anything other than `LIVE` stays on paper.
    pub fn from_env() -> Result<Self, AlpacaError> {
        let api_key = std::env::var("ALPACA_KEY")
            .map_err(|_| AlpacaError::MissingCredentials("ALPACA_KEY"))?;
        let api_secret = std::env::var("ALPACA_SECRET")
            .map_err(|_| AlpacaError::MissingCredentials("ALPACA_SECRET"))?;
        let environment = match std::env::var("ALPACA_ENV").as_deref() {
            Ok("LIVE" | "live") => AlpacaEnvironment::Live,
            _ => AlpacaEnvironment::Paper,
        };
        Ok(Self::new(api_key, api_secret, environment))
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Retry policy for transport-level failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum attempts before giving up.
    pub max_attempts: u32,
    /// Initial backoff delay.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
    /// Backoff growth factor.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_urls() {
        assert_eq!(
            AlpacaEnvironment::Paper.trading_base_url(),
            "https://paper-api.alpaca.markets"
        );
        assert_eq!(
            AlpacaEnvironment::Live.trading_base_url(),
            "https://api.alpaca.markets"
        );
        assert!(
            AlpacaEnvironment::Paper
                .options_stream_url()
                .contains("sandbox")
        );
        assert!(
            !AlpacaEnvironment::Live
                .options_stream_url()
                .contains("sandbox")
        );
    }

    #[test]
    fn environment_is_live() {
        assert!(AlpacaEnvironment::Live.is_live());
        assert!(!AlpacaEnvironment::Paper.is_live());
    }
}
