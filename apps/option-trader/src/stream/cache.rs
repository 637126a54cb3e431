//! Live quote cache fed by the options stream.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::domain::Quote;
use crate::gateway::QuoteSource;

/// Last-write-wins cache of streamed quotes.
///
/// One writer (the stream read loop) appends updates; the monitor loop
/// reads snapshots. The lock makes each read-then-use of a single entry
/// atomic; no cross-entry consistency or staleness bound is promised.
#[derive(Debug, Default)]
pub struct QuoteCache {
    quotes: Mutex<HashMap<String, Quote>>,
}

impl QuoteCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest quote for a symbol.
    pub fn update(&self, symbol: impl Into<String>, quote: Quote) {
        self.quotes.lock().insert(symbol.into(), quote);
    }

    /// Number of symbols with at least one observed quote.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.lock().len()
    }

    /// True if no quotes have been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.lock().is_empty()
    }
}

impl QuoteSource for QuoteCache {
    fn get_quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes.lock().get(symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn last_write_wins() {
        let cache = QuoteCache::new();
        cache.update("SPY250321P00455000", Quote::new(Decimal::ONE, Decimal::TWO));
        cache.update(
            "SPY250321P00455000",
            Quote::new(Decimal::TWO, Decimal::from(3)),
        );

        let quote = cache.get_quote("SPY250321P00455000").unwrap();
        assert_eq!(quote.bid, Decimal::TWO);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_symbol_is_none() {
        let cache = QuoteCache::new();
        assert!(cache.get_quote("AAPL240119C00190000").is_none());
        assert!(cache.is_empty());
    }
}
