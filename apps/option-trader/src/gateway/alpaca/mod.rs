//! Alpaca REST adapter: config, transport, wire types, client.

pub mod api_types;
pub mod client;
pub mod config;
pub mod error;
pub mod http;

pub use client::{AlpacaClient, ChainContract};
pub use config::{AlpacaConfig, AlpacaEnvironment, RetryConfig};
pub use error::AlpacaError;
