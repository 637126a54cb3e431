//! Interactive terminal client for trading listed equity options.
//!
//! Orders go through Alpaca's REST trading API; live option quotes
//! arrive over the msgpack streaming feed. The library splits into:
//!
//! - [`domain`]: OCC symbols, order lifecycle types, quotes, strike
//!   selection
//! - [`gateway`]: broker ports and the Alpaca adapter
//! - [`stream`]: options websocket client and the shared quote cache
//! - [`monitor`]: the interactive order-monitoring state machine
//! - [`session`]: the outer interactive loop

pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod monitor;
pub mod session;
pub mod stream;
pub mod telemetry;

pub use config::ClientConfig;
pub use error::ClientError;
