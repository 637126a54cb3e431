//! Option Trader Binary
//!
//! Starts the interactive options trading client.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p option-trader
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `ALPACA_KEY`: Broker API key
//! - `ALPACA_SECRET`: Broker API secret
//!
//! ## Optional
//! - `ALPACA_ENV`: PAPER | LIVE (default: PAPER)
//! - `ORDER_POLL_INTERVAL_MS`: Sleep between status polls (default: 2000)
//! - `CHAIN_WINDOW_RADIUS`: Strikes shown per side (default: 5)
//! - `OPTION_TRADER_LOG`: Log file path (default: option-trader.log)
//! - `RUST_LOG`: Log level (default: info)

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use option_trader::config::ClientConfig;
use option_trader::gateway::alpaca::{AlpacaClient, AlpacaConfig};
use option_trader::session::Session;
use option_trader::stream::OptionsStream;
use option_trader::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    telemetry::init_tracing(&config.log_path)?;

    let alpaca_config = AlpacaConfig::from_env().context("broker credentials")?;
    let environment = if alpaca_config.environment.is_live() {
        "LIVE"
    } else {
        "PAPER"
    };
    tracing::info!(environment, "Starting option trader");

    let gateway = AlpacaClient::new(&alpaca_config).context("broker client")?;
    let account_status = gateway
        .account_status()
        .await
        .context("account status check")?;
    println!("Connected to Alpaca ({environment}); account status: {account_status}");
    if gateway.is_live() {
        println!("WARNING: live trading environment - orders execute real trades.");
    }

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let stream = OptionsStream::connect(&alpaca_config, shutdown.clone())
        .await
        .context("options stream")?;

    let session = Session::new(gateway, stream.handle, config, shutdown.clone());
    let result = session.run().await;

    shutdown.cancel();
    let _ = stream.task.await;

    tracing::info!("Option trader stopped");
    match result {
        Err(option_trader::ClientError::Interrupted) => {
            println!("Interrupted.");
            Ok(())
        }
        other => other.map_err(Into::into),
    }
}

/// Cancel the shutdown token on Ctrl+C so the stream task and any
/// monitor loop wind down.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, initiating shutdown");
            shutdown.cancel();
        }
    });
}
