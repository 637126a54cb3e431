//! Streaming market data: websocket client, codec, and quote cache.

pub mod cache;
pub mod client;
pub mod codec;
pub mod messages;

pub use cache::QuoteCache;
pub use client::{OptionsStream, StreamError, StreamHandle};
