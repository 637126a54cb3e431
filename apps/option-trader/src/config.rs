//! Environment-driven client configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::monitor::MonitorConfig;

/// Default sleep between order-status polls, in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default bounded wait for a keyboard command each tick.
const DEFAULT_COMMAND_POLL_TIMEOUT_MS: u64 = 100;

/// Default sleep between cancel-confirmation polls.
const DEFAULT_CANCEL_WAIT_INTERVAL_MS: u64 = 1_000;

/// Default cap on cancel-confirmation polls.
const DEFAULT_CANCEL_WAIT_MAX_POLLS: u32 = 30;

/// Default strikes shown on each side of the nearest strike.
const DEFAULT_CHAIN_WINDOW_RADIUS: usize = 5;

/// Client-level settings parsed from the environment.
///
/// Broker credentials live in [`crate::gateway::alpaca::AlpacaConfig`];
/// this covers the interactive loop's own knobs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Monitor loop timing.
    pub monitor: MonitorConfig,
    /// Strikes shown on each side of the nearest strike.
    pub chain_window_radius: usize,
    /// Where structured logs are written.
    pub log_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            chain_window_radius: DEFAULT_CHAIN_WINDOW_RADIUS,
            log_path: PathBuf::from("option-trader.log"),
        }
    }
}

impl ClientConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    ///
    /// Recognized variables: `ORDER_POLL_INTERVAL_MS`,
    /// `COMMAND_POLL_TIMEOUT_MS`, `CANCEL_WAIT_INTERVAL_MS`,
    /// `CANCEL_WAIT_MAX_POLLS`, `CHAIN_WINDOW_RADIUS`,
    /// `OPTION_TRADER_LOG`.
    #[must_use]
    pub fn from_env() -> Self {
        let monitor = MonitorConfig {
            poll_interval: Duration::from_millis(env_u64(
                "ORDER_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )),
            command_poll_timeout: Duration::from_millis(env_u64(
                "COMMAND_POLL_TIMEOUT_MS",
                DEFAULT_COMMAND_POLL_TIMEOUT_MS,
            )),
            cancel_wait_interval: Duration::from_millis(env_u64(
                "CANCEL_WAIT_INTERVAL_MS",
                DEFAULT_CANCEL_WAIT_INTERVAL_MS,
            )),
            max_cancel_polls: env_u64(
                "CANCEL_WAIT_MAX_POLLS",
                u64::from(DEFAULT_CANCEL_WAIT_MAX_POLLS),
            )
            .try_into()
            .unwrap_or(DEFAULT_CANCEL_WAIT_MAX_POLLS),
        };

        let chain_window_radius = std::env::var("CHAIN_WINDOW_RADIUS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CHAIN_WINDOW_RADIUS);

        let log_path = std::env::var("OPTION_TRADER_LOG")
            .map_or_else(|_| PathBuf::from("option-trader.log"), PathBuf::from);

        Self {
            monitor,
            chain_window_radius,
            log_path,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ClientConfig::default();
        assert_eq!(config.monitor.poll_interval, Duration::from_secs(2));
        assert_eq!(config.monitor.max_cancel_polls, 30);
        assert_eq!(config.chain_window_radius, 5);
    }
}
