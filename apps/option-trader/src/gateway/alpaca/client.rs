//! Alpaca trading client implementing the `OrderGateway` port.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{OptionRight, Quote};
use crate::error::ClientError;
use crate::gateway::{OrderGateway, OrderSnapshot, PlaceOrderRequest, Position};

use super::api_types::{
    LatestStockQuoteBody, OptionContractsBody, OrderBody, OrderRequestBody, PositionBody,
    ReplaceRequestBody,
};
use super::config::AlpacaConfig;
use super::error::AlpacaError;
use super::http::AlpacaHttpClient;

/// One contract from a chain listing, reduced to what the session needs.
#[derive(Debug, Clone)]
pub struct ChainContract {
    /// OCC symbol.
    pub symbol: String,
    /// Call or put.
    pub right: OptionRight,
    /// Strike price.
    pub strike: Decimal,
}

/// Alpaca REST client for trading and market data.
#[derive(Debug, Clone)]
pub struct AlpacaClient {
    http: AlpacaHttpClient,
    live: bool,
}

impl AlpacaClient {
    /// Create a client from configuration.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        Ok(Self {
            http: AlpacaHttpClient::new(config)?,
            live: config.environment.is_live(),
        })
    }

    /// Check if this client trades against the live environment.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live
    }

    /// Verify connectivity and credentials by fetching account status.
    pub async fn account_status(&self) -> Result<String, ClientError> {
        #[derive(serde::Deserialize)]
        struct AccountBody {
            status: String,
        }
        let account: AccountBody = self.http.get("/v2/account").await.map_err(ClientError::from)?;
        Ok(account.status)
    }

    /// Latest stock quote for an underlying, from the data API.
    pub async fn latest_stock_quote(&self, symbol: &str) -> Result<Quote, ClientError> {
        let body: LatestStockQuoteBody = self
            .http
            .data_get(&format!("/v2/stocks/{symbol}/quotes/latest"))
            .await
            .map_err(ClientError::from)?;
        Ok(Quote::new(body.quote.bid_price, body.quote.ask_price))
    }

    /// Listed option contracts for an underlying and expiration date.
    pub async fn option_contracts(
        &self,
        underlying: &str,
        expiration_date: &str,
    ) -> Result<Vec<ChainContract>, ClientError> {
        let body: OptionContractsBody = self
            .http
            .get(&format!(
                "/v2/options/contracts?underlying_symbols={underlying}\
                 &expiration_date={expiration_date}&limit=500"
            ))
            .await
            .map_err(ClientError::from)?;

        let contracts = body
            .option_contracts
            .into_iter()
            .filter_map(|c| {
                let strike = c.strike()?;
                let right = if c.is_call() {
                    OptionRight::Call
                } else {
                    OptionRight::Put
                };
                Some(ChainContract {
                    symbol: c.symbol,
                    right,
                    strike,
                })
            })
            .collect();
        Ok(contracts)
    }
}

#[async_trait]
impl OrderGateway for AlpacaClient {
    async fn place_order(&self, request: &PlaceOrderRequest) -> Result<OrderSnapshot, ClientError> {
        if self.live {
            tracing::warn!(
                symbol = %request.symbol,
                "Submitting LIVE order - this will execute real trades"
            );
        }

        let body = OrderRequestBody {
            symbol: request.symbol.clone(),
            qty: request.qty.to_string(),
            side: request.side.as_str().to_string(),
            order_type: "limit".to_string(),
            time_in_force: "day".to_string(),
            limit_price: request.limit_price.to_string(),
            client_order_id: Some(Uuid::new_v4().to_string()),
        };

        tracing::info!(
            symbol = %request.symbol,
            side = %request.side,
            qty = request.qty,
            limit_price = %request.limit_price,
            "Placing order"
        );

        let response: OrderBody = self
            .http
            .post("/v2/orders", &body)
            .await
            .map_err(ClientError::from)?;

        tracing::info!(order_id = %response.id, status = %response.status, "Order placed");
        Ok(response.to_snapshot())
    }

    async fn replace_order(
        &self,
        order_id: &str,
        limit_price: Decimal,
    ) -> Result<OrderSnapshot, ClientError> {
        let body = ReplaceRequestBody {
            limit_price: limit_price.to_string(),
        };
        let response: OrderBody = self
            .http
            .patch(&format!("/v2/orders/{order_id}"), &body)
            .await
            .map_err(ClientError::from)?;

        tracing::info!(
            old_order_id = %order_id,
            new_order_id = %response.id,
            limit_price = %limit_price,
            "Order replaced"
        );
        Ok(response.to_snapshot())
    }

    async fn cancel_order(&self, order_id: &str) -> Result<(), ClientError> {
        self.http
            .delete(&format!("/v2/orders/{order_id}"))
            .await
            .map_err(ClientError::from)?;
        tracing::info!(order_id = %order_id, "Cancel requested");
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> Result<OrderSnapshot, ClientError> {
        let response: OrderBody = self
            .http
            .get(&format!("/v2/orders/{order_id}"))
            .await
            .map_err(ClientError::from)?;
        Ok(response.to_snapshot())
    }

    async fn open_orders(&self) -> Result<Vec<OrderSnapshot>, ClientError> {
        let responses: Vec<OrderBody> = self
            .http
            .get("/v2/orders?status=open&limit=100")
            .await
            .map_err(ClientError::from)?;
        Ok(responses.iter().map(OrderBody::to_snapshot).collect())
    }

    async fn positions(&self) -> Result<Vec<Position>, ClientError> {
        let responses: Vec<PositionBody> =
            self.http.get("/v2/positions").await.map_err(ClientError::from)?;
        Ok(responses
            .into_iter()
            .filter_map(|p| {
                let signed_qty = p.qty.parse().ok()?;
                Some(Position {
                    symbol: p.symbol,
                    signed_qty,
                })
            })
            .collect())
    }
}
