//! Options stream wire messages.
//!
//! The options feed speaks MessagePack: every frame is an array of maps,
//! each tagged by a `T` field. Only the message types this client needs
//! are modeled; anything else is skipped by the codec.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Client -> server authentication message.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    /// Always `auth`.
    pub action: &'static str,
    /// API key.
    pub key: String,
    /// API secret.
    pub secret: String,
}

impl AuthRequest {
    /// Build an auth request.
    #[must_use]
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            action: "auth",
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// Client -> server quote subscription message.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    /// Always `subscribe`.
    pub action: &'static str,
    /// OCC symbols to receive quotes for.
    pub quotes: Vec<String>,
}

impl SubscribeRequest {
    /// Build a subscription request.
    #[must_use]
    pub fn new(quotes: Vec<String>) -> Self {
        Self {
            action: "subscribe",
            quotes,
        }
    }
}

/// Control acknowledgment (`T: success`).
#[derive(Debug, Clone, Deserialize)]
pub struct SuccessMessage {
    /// `connected` or `authenticated`.
    pub msg: String,
}

/// Server error (`T: error`).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMessage {
    /// Numeric error code.
    #[serde(default)]
    pub code: Option<u32>,
    /// Error description.
    pub msg: String,
}

/// Subscription confirmation (`T: subscription`).
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionMessage {
    /// Quote symbols now subscribed.
    #[serde(default)]
    pub quotes: Vec<String>,
}

/// Option quote update (`T: q`).
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteMessage {
    /// OCC option symbol.
    #[serde(rename = "S")]
    pub symbol: String,
    /// Bid price.
    #[serde(rename = "bp")]
    pub bid_price: Decimal,
    /// Ask price.
    #[serde(rename = "ap")]
    pub ask_price: Decimal,
    /// Quote timestamp.
    #[serde(rename = "t", default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A decoded stream message.
#[derive(Debug, Clone)]
pub enum StreamMessage {
    /// Control acknowledgment.
    Success(SuccessMessage),
    /// Server error.
    Error(ErrorMessage),
    /// Subscription confirmation.
    Subscription(SubscriptionMessage),
    /// Option quote.
    Quote(QuoteMessage),
}
