//! Broker-facing ports and the Alpaca adapter.
//!
//! The monitor and session code talk to these traits, never to the
//! Alpaca types directly; tests substitute scripted implementations.

pub mod alpaca;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{OrderSide, OrderStatus, Quote};
use crate::error::ClientError;

/// A request to place a new limit order.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    /// OCC symbol to trade.
    pub symbol: String,
    /// Number of contracts.
    pub qty: u32,
    /// Buy or sell.
    pub side: OrderSide,
    /// Limit price.
    pub limit_price: Decimal,
}

/// Broker-reported view of one order.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    /// Broker-side order id.
    pub id: String,
    /// Symbol the order trades.
    pub symbol: String,
    /// Number of contracts.
    pub qty: u32,
    /// Buy or sell.
    pub side: OrderSide,
    /// Current status.
    pub status: OrderStatus,
    /// Limit price, if the order has one.
    pub limit_price: Option<Decimal>,
}

/// One open position with its signed quantity (negative = short).
#[derive(Debug, Clone)]
pub struct Position {
    /// Symbol held.
    pub symbol: String,
    /// Signed quantity.
    pub signed_qty: Decimal,
}

/// Trading operations the order lifecycle needs from the broker.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Place a new day limit order.
    async fn place_order(&self, request: &PlaceOrderRequest) -> Result<OrderSnapshot, ClientError>;

    /// Replace an order's limit price in place. The broker may mint a
    /// new order id even for an in-place replace.
    async fn replace_order(
        &self,
        order_id: &str,
        limit_price: Decimal,
    ) -> Result<OrderSnapshot, ClientError>;

    /// Cancel an order.
    async fn cancel_order(&self, order_id: &str) -> Result<(), ClientError>;

    /// Fetch the current state of one order.
    async fn get_order(&self, order_id: &str) -> Result<OrderSnapshot, ClientError>;

    /// Fetch all open orders.
    async fn open_orders(&self) -> Result<Vec<OrderSnapshot>, ClientError>;

    /// Fetch all open positions with signed quantities.
    async fn positions(&self) -> Result<Vec<Position>, ClientError>;
}

/// Best bid/ask lookup for one symbol.
///
/// Implemented by the streaming quote cache; reads are instantaneous
/// snapshots with last-write-wins freshness.
pub trait QuoteSource: Send + Sync {
    /// Latest quote for `symbol`, if one has been observed.
    fn get_quote(&self, symbol: &str) -> Option<Quote>;
}

/// Signed position size for `symbol` from a gateway position listing,
/// treating an absent entry as flat.
pub async fn signed_position(
    gateway: &dyn OrderGateway,
    symbol: &str,
) -> Result<Decimal, ClientError> {
    let positions = gateway.positions().await?;
    Ok(positions
        .into_iter()
        .find(|p| p.symbol == symbol)
        .map_or(Decimal::ZERO, |p| p.signed_qty))
}
