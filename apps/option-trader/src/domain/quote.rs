//! Quote snapshot value type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A best bid/ask snapshot for one symbol.
///
/// Quotes are ephemeral: the monitor reads a fresh one on every poll tick
/// and every adjust prompt, and nothing is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Best bid price.
    pub bid: Decimal,
    /// Best ask price.
    pub ask: Decimal,
    /// When the quote was produced, if the source reports it.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Quote {
    /// Create a quote without a timestamp.
    #[must_use]
    pub const fn new(bid: Decimal, ask: Decimal) -> Self {
        Self {
            bid,
            ask,
            timestamp: None,
        }
    }

    /// Midpoint of bid and ask.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bid {:.2} / ask {:.2}", self.bid, self.ask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_mid() {
        let quote = Quote::new(Decimal::new(100, 2), Decimal::new(120, 2));
        assert_eq!(quote.mid(), Decimal::new(110, 2));
    }

    #[test]
    fn quote_display() {
        let quote = Quote::new(Decimal::new(125, 2), Decimal::new(135, 2));
        assert_eq!(quote.to_string(), "bid 1.25 / ask 1.35");
    }
}
