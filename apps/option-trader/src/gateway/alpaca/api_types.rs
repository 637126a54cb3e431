//! Alpaca API request and response types.
//!
//! These map directly to Alpaca's REST API wire format. Numeric fields
//! arrive as strings and are parsed at the adapter boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{OrderSide, OrderStatus};
use crate::gateway::OrderSnapshot;

/// Error payload shape returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error code, when present.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// New order request body.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequestBody {
    /// OCC or equity symbol.
    pub symbol: String,
    /// Quantity, stringly per the API.
    pub qty: String,
    /// `buy` or `sell`.
    pub side: String,
    /// Order type; always `limit` for this client.
    #[serde(rename = "type")]
    pub order_type: String,
    /// Time in force; options orders only support `day`.
    pub time_in_force: String,
    /// Limit price.
    pub limit_price: String,
    /// Client-assigned order id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

/// In-place replace request body.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceRequestBody {
    /// New limit price.
    pub limit_price: String,
}

/// Order response body.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderBody {
    /// Broker order id.
    pub id: String,
    /// Symbol.
    pub symbol: String,
    /// Quantity (as string).
    pub qty: String,
    /// Status token, lower-case.
    pub status: String,
    /// `buy` or `sell`.
    pub side: String,
    /// Limit price, if any.
    #[serde(default)]
    pub limit_price: Option<String>,
    /// Filled quantity (as string).
    #[serde(default)]
    pub filled_qty: Option<String>,
    /// Average fill price (as string).
    #[serde(default)]
    pub filled_avg_price: Option<String>,
}

impl OrderBody {
    /// Convert to the gateway-neutral snapshot.
    #[must_use]
    pub fn to_snapshot(&self) -> OrderSnapshot {
        let side = if self.side == "sell" {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        };
        OrderSnapshot {
            id: self.id.clone(),
            symbol: self.symbol.clone(),
            qty: self.qty.parse().unwrap_or_else(|e| {
                tracing::warn!(order_id = %self.id, qty = %self.qty, error = %e, "Unparseable order quantity");
                0
            }),
            side,
            status: OrderStatus::parse(&self.status),
            limit_price: self.limit_price.as_ref().and_then(|p| p.parse().ok()),
        }
    }
}

/// Position response body.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionBody {
    /// Symbol held.
    pub symbol: String,
    /// Signed quantity (as string, negative when short).
    pub qty: String,
}

/// Latest stock quote envelope from the data API.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestStockQuoteBody {
    /// Symbol queried.
    #[serde(default)]
    pub symbol: Option<String>,
    /// The quote itself.
    pub quote: StockQuoteBody,
}

/// Stock quote fields, short keys per the data API.
#[derive(Debug, Clone, Deserialize)]
pub struct StockQuoteBody {
    /// Ask price.
    #[serde(rename = "ap")]
    pub ask_price: Decimal,
    /// Bid price.
    #[serde(rename = "bp")]
    pub bid_price: Decimal,
}

/// Option contracts listing envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionContractsBody {
    /// Contracts in this page.
    #[serde(default)]
    pub option_contracts: Vec<OptionContractBody>,
}

/// One listed option contract.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionContractBody {
    /// OCC symbol.
    pub symbol: String,
    /// `call` or `put`.
    #[serde(rename = "type")]
    pub contract_type: String,
    /// Strike price (as string).
    pub strike_price: String,
    /// Expiration date, `YYYY-MM-DD`.
    pub expiration_date: String,
}

impl OptionContractBody {
    /// Parsed strike price, when well-formed.
    #[must_use]
    pub fn strike(&self) -> Option<Decimal> {
        self.strike_price.parse().ok()
    }

    /// True if this is a call contract.
    #[must_use]
    pub fn is_call(&self) -> bool {
        self.contract_type == "call"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_body_to_snapshot() {
        let body: OrderBody = serde_json::from_str(
            r#"{
                "id": "abc-123",
                "symbol": "AAPL240119C00190000",
                "qty": "2",
                "status": "partially_filled",
                "side": "sell",
                "limit_price": "1.25"
            }"#,
        )
        .unwrap();

        let snapshot = body.to_snapshot();
        assert_eq!(snapshot.id, "abc-123");
        assert_eq!(snapshot.qty, 2);
        assert_eq!(snapshot.side, OrderSide::Sell);
        assert_eq!(snapshot.status, OrderStatus::PartiallyFilled);
        assert_eq!(snapshot.limit_price, Some(Decimal::new(125, 2)));
    }

    #[test]
    fn order_body_malformed_qty_defaults_to_zero() {
        let body: OrderBody = serde_json::from_str(
            r#"{"id":"x","symbol":"SPY","qty":"lots","status":"new","side":"buy"}"#,
        )
        .unwrap();
        assert_eq!(body.to_snapshot().qty, 0);
    }

    #[test]
    fn order_body_unknown_status() {
        let body: OrderBody = serde_json::from_str(
            r#"{"id":"x","symbol":"SPY","qty":"1","status":"held","side":"buy"}"#,
        )
        .unwrap();
        assert_eq!(body.to_snapshot().status, OrderStatus::Unknown);
    }

    #[test]
    fn latest_stock_quote_parses_short_keys() {
        let body: LatestStockQuoteBody = serde_json::from_str(
            r#"{"symbol":"SPY","quote":{"ap":455.12,"bp":455.08,"t":"2025-03-21T14:30:00Z"}}"#,
        )
        .unwrap();
        assert_eq!(body.quote.ask_price, Decimal::new(45512, 2));
        assert_eq!(body.quote.bid_price, Decimal::new(45508, 2));
    }

    #[test]
    fn option_contract_parses() {
        let body: OptionContractBody = serde_json::from_str(
            r#"{
                "symbol": "SPY250321P00455000",
                "type": "put",
                "strike_price": "455",
                "expiration_date": "2025-03-21"
            }"#,
        )
        .unwrap();
        assert!(!body.is_call());
        assert_eq!(body.strike(), Some(Decimal::from(455)));
    }

    #[test]
    fn order_request_serializes_limit_fields() {
        let request = OrderRequestBody {
            symbol: "SPY250321P00455000".to_string(),
            qty: "1".to_string(),
            side: "buy".to_string(),
            order_type: "limit".to_string(),
            time_in_force: "day".to_string(),
            limit_price: "2.50".to_string(),
            client_order_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "limit");
        assert_eq!(json["time_in_force"], "day");
        assert!(json.get("client_order_id").is_none());
    }
}
