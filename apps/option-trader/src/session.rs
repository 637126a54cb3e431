//! Interactive trading session.
//!
//! The outer loop: pick a ticker, look at the chain around the current
//! price, adopt any orphaned open orders, place a limit order, and hand
//! it to the monitor. Opening fills roll into a closing order and a
//! fresh monitoring session. Every broker or feed failure reports and
//! returns to the ticker prompt.

use std::io::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::domain::{
    classify_intent, nearest_strike, strike_window, OptionRight, OrderOutcome, OrderSide, Quote,
    TrackedOrder,
};
use crate::error::ClientError;
use crate::gateway::alpaca::{AlpacaClient, ChainContract};
use crate::gateway::{signed_position, OrderGateway, PlaceOrderRequest, QuoteSource};
use crate::monitor::orphan::OrphanScan;
use crate::monitor::roundtrip::RoundTripCoordinator;
use crate::monitor::terminal::TerminalPrompter;
use crate::monitor::{KeyboardInput, OrderMonitor, Prompter};
use crate::stream::StreamHandle;

/// A parsed `B/S C/P PRICE [QTY]` action line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeAction {
    /// Buy or sell.
    pub side: OrderSide,
    /// Call or put.
    pub right: OptionRight,
    /// Limit price.
    pub price: Decimal,
    /// Contracts, defaulting to 1.
    pub qty: u32,
}

impl TradeAction {
    /// Parse an action line like `B C 1.25` or `S P 0.80 3`.
    /// Tokens are case-insensitive. Returns `None` for anything else.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let side = match tokens.next()? {
            "b" | "B" => OrderSide::Buy,
            "s" | "S" => OrderSide::Sell,
            _ => return None,
        };
        let right = match tokens.next()? {
            "c" | "C" => OptionRight::Call,
            "p" | "P" => OptionRight::Put,
            _ => return None,
        };
        let price: Decimal = tokens.next()?.parse().ok()?;
        if price.is_sign_negative() {
            return None;
        }
        let qty = match tokens.next() {
            Some(raw) => raw.parse().ok().filter(|q| *q > 0)?,
            None => 1,
        };
        if tokens.next().is_some() {
            return None;
        }
        Some(Self {
            side,
            right,
            price,
            qty,
        })
    }
}

/// Check a limit price against the live quote: buys at or below the
/// ask, sells at or above the bid. `None` when no quote is available
/// to check against.
#[must_use]
pub fn price_within_market(action: &TradeAction, quote: &Quote) -> bool {
    match action.side {
        OrderSide::Buy => action.price <= quote.ask,
        OrderSide::Sell => action.price >= quote.bid,
    }
}

/// One interactive trading session over a gateway and quote stream.
pub struct Session {
    gateway: AlpacaClient,
    stream: StreamHandle,
    config: ClientConfig,
    shutdown: CancellationToken,
}

impl Session {
    /// Create a session over the given collaborators.
    #[must_use]
    pub const fn new(
        gateway: AlpacaClient,
        stream: StreamHandle,
        config: ClientConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            stream,
            config,
            shutdown,
        }
    }

    /// Run the outer loop until the user quits or shutdown is signaled.
    pub async fn run(&self) -> Result<(), ClientError> {
        loop {
            if self.shutdown.is_cancelled() {
                return Ok(());
            }

            let ticker = read_line("Enter ticker (q to quit): ").await?;
            if ticker.is_empty() {
                continue;
            }
            if ticker.eq_ignore_ascii_case("q") {
                return Ok(());
            }

            let underlying = ticker.to_ascii_uppercase();
            if let Err(e) = self.trade_underlying(&underlying).await {
                match e {
                    ClientError::Interrupted => return Err(ClientError::Interrupted),
                    other => {
                        tracing::warn!(underlying = %underlying, error = %other, "Session round failed");
                        println!("Error: {other}");
                    }
                }
            }
        }
    }

    /// One full round for an underlying: quote, chain, orphans, order,
    /// monitoring, round trip.
    async fn trade_underlying(&self, underlying: &str) -> Result<(), ClientError> {
        let stock = self.gateway.latest_stock_quote(underlying).await?;
        println!("{underlying}: {stock}");

        self.show_positions(underlying).await?;

        let expiry = match self.prompt_expiry().await? {
            Some(expiry) => expiry,
            None => return Ok(()),
        };

        let contracts = self
            .gateway
            .option_contracts(underlying, &expiry.format("%Y-%m-%d").to_string())
            .await?;
        if contracts.is_empty() {
            println!("No contracts listed for {underlying} expiring {expiry}.");
            return Ok(());
        }

        self.stream
            .subscribe(contracts.iter().map(|c| c.symbol.clone()).collect());

        let strikes = distinct_strikes(&contracts);
        let reference = stock.mid();
        // Non-empty contracts imply a non-empty strike list.
        let Some(center) = nearest_strike(&strikes, reference) else {
            return Ok(());
        };
        let window = strike_window(&strikes, center, self.config.chain_window_radius);
        self.render_chain(&contracts, window, strikes[center]);

        if self.offer_orphans(underlying).await? {
            return Ok(());
        }

        let Some(action) = self.prompt_action().await? else {
            return Ok(());
        };

        let Some(contract) = find_contract(&contracts, action.right, strikes[center]) else {
            println!("No {} contract at strike {}.", action.right, strikes[center]);
            return Ok(());
        };

        let cache = self.stream.cache();
        if let Some(quote) = cache.get_quote(&contract.symbol) {
            println!("{}: {quote}", contract.symbol);
            if !price_within_market(&action, &quote) {
                println!(
                    "Limit {} is outside the market ({quote}); order not placed.",
                    action.price
                );
                return Ok(());
            }
        } else {
            println!("No live quote for {} yet; placing unchecked.", contract.symbol);
        }

        let position = signed_position(&self.gateway, &contract.symbol).await?;
        let intent = classify_intent(action.side, position);

        let request = PlaceOrderRequest {
            symbol: contract.symbol.clone(),
            qty: action.qty,
            side: action.side,
            limit_price: action.price,
        };
        let snapshot = self.gateway.place_order(&request).await?;
        println!("Order placed: {}", snapshot.id);

        let order = TrackedOrder::new(
            snapshot.id,
            contract.symbol.clone(),
            action.qty,
            action.side,
            action.price,
            intent,
        );
        self.monitor_lifecycle(order, cache.as_ref()).await
    }

    /// Print any open positions in options on this underlying.
    async fn show_positions(&self, underlying: &str) -> Result<(), ClientError> {
        let positions = self.gateway.positions().await?;
        for position in positions
            .iter()
            .filter(|p| p.symbol.starts_with(underlying))
        {
            println!("Position: {} {:+}", position.symbol, position.signed_qty);
        }
        Ok(())
    }

    async fn prompt_expiry(&self) -> Result<Option<NaiveDate>, ClientError> {
        let line = read_line("Expiration date (YYYY-MM-DD, blank to go back): ").await?;
        if line.is_empty() {
            return Ok(None);
        }
        match NaiveDate::parse_from_str(&line, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                println!("Unrecognized date: {line}");
                Ok(None)
            }
        }
    }

    /// Render call/put quotes for each strike in the display window.
    fn render_chain(&self, contracts: &[ChainContract], window: &[Decimal], nearest: Decimal) {
        let cache = self.stream.cache();
        println!("{:>10}  {:^23}  {:^23}", "strike", "call", "put");
        for strike in window {
            let call = chain_quote(&*cache, contracts, OptionRight::Call, *strike);
            let put = chain_quote(&*cache, contracts, OptionRight::Put, *strike);
            let marker = if *strike == nearest { "*" } else { " " };
            println!("{marker}{strike:>9}  {call:^23}  {put:^23}");
        }
    }

    /// Offer to adopt each orphaned open order. Returns true when one
    /// was adopted and monitored, which ends the round.
    async fn offer_orphans(&self, underlying: &str) -> Result<bool, ClientError> {
        let scan = OrphanScan::new(&self.gateway);
        let orphans = scan.find(underlying).await?;
        for snapshot in &orphans {
            println!(
                "Open order found: {} {} x{} ({})",
                snapshot.side.as_str(),
                snapshot.symbol,
                snapshot.qty,
                snapshot.status
            );
            let answer = read_line("Monitor this order? (y/n): ").await?;
            if !answer.eq_ignore_ascii_case("y") {
                continue;
            }
            match scan.adopt(snapshot).await {
                Ok(order) => {
                    self.stream.subscribe(vec![order.symbol.clone()]);
                    let cache = self.stream.cache();
                    self.monitor_lifecycle(order, cache.as_ref()).await?;
                    return Ok(true);
                }
                Err(e) => println!("Cannot adopt: {e}"),
            }
        }
        Ok(false)
    }

    async fn prompt_action(&self) -> Result<Option<TradeAction>, ClientError> {
        loop {
            let line =
                read_line("Action (B/S C/P PRICE [QTY], blank to go back): ").await?;
            if line.is_empty() {
                return Ok(None);
            }
            match TradeAction::parse(&line) {
                Some(action) => return Ok(Some(action)),
                None => println!("Unrecognized action: {line}"),
            }
        }
    }

    /// Monitor an order to its outcome, then chain into the closing
    /// leg on an opening fill.
    async fn monitor_lifecycle(
        &self,
        mut order: TrackedOrder,
        quotes: &dyn QuoteSource,
    ) -> Result<(), ClientError> {
        let mut prompter = TerminalPrompter::new()?;
        let mut input = KeyboardInput::new();
        let monitor = OrderMonitor::new(
            &self.gateway,
            quotes,
            self.config.monitor.clone(),
            self.shutdown.clone(),
        );
        let coordinator = RoundTripCoordinator::new(&self.gateway, quotes);

        loop {
            let outcome = monitor.run(&mut order, &mut input, &mut prompter).await?;
            if outcome != OrderOutcome::Filled {
                return Ok(());
            }
            match coordinator.offer_closing_order(&order, &mut prompter).await {
                Ok(Some(closing)) => order = closing,
                Ok(None) => return Ok(()),
                Err(e) => {
                    prompter.notice(&format!("Closing order failed: {e}"));
                    return Ok(());
                }
            }
        }
    }
}

/// Ascending distinct strikes across both rights of a chain.
fn distinct_strikes(contracts: &[ChainContract]) -> Vec<Decimal> {
    let mut strikes: Vec<Decimal> = contracts.iter().map(|c| c.strike).collect();
    strikes.sort_unstable();
    strikes.dedup();
    strikes
}

/// The contract at a given right and strike, if listed.
fn find_contract(
    contracts: &[ChainContract],
    right: OptionRight,
    strike: Decimal,
) -> Option<&ChainContract> {
    contracts
        .iter()
        .find(|c| c.right == right && c.strike == strike)
}

/// Format one leg of the chain table.
fn chain_quote(
    cache: &dyn QuoteSource,
    contracts: &[ChainContract],
    right: OptionRight,
    strike: Decimal,
) -> String {
    find_contract(contracts, right, strike)
        .and_then(|c| cache.get_quote(&c.symbol))
        .map_or_else(|| "-".to_string(), |q| q.to_string())
}

/// Prompt and read one trimmed line from stdin.
async fn read_line(prompt: &str) -> Result<String, ClientError> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let line = tokio::task::spawn_blocking(|| -> Result<String, std::io::Error> {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line)
    })
    .await
    .map_err(|e| ClientError::Transport(format!("stdin task failed: {e}")))??;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_buy_call_with_default_qty() {
        let action = TradeAction::parse("b c 1.25").unwrap();
        assert_eq!(action.side, OrderSide::Buy);
        assert_eq!(action.right, OptionRight::Call);
        assert_eq!(action.price, dec!(1.25));
        assert_eq!(action.qty, 1);
    }

    #[test]
    fn parses_sell_put_with_qty() {
        let action = TradeAction::parse("S P 0.80 3").unwrap();
        assert_eq!(action.side, OrderSide::Sell);
        assert_eq!(action.right, OptionRight::Put);
        assert_eq!(action.qty, 3);
    }

    #[test]
    fn rejects_malformed_actions() {
        assert_eq!(TradeAction::parse(""), None);
        assert_eq!(TradeAction::parse("x c 1.0"), None);
        assert_eq!(TradeAction::parse("b x 1.0"), None);
        assert_eq!(TradeAction::parse("b c"), None);
        assert_eq!(TradeAction::parse("b c -1.0"), None);
        assert_eq!(TradeAction::parse("b c 1.0 0"), None);
        assert_eq!(TradeAction::parse("b c 1.0 2 extra"), None);
    }

    #[test]
    fn buy_must_not_exceed_ask() {
        let quote = Quote::new(dec!(1.00), dec!(1.10));
        let mut action = TradeAction::parse("b c 1.10").unwrap();
        assert!(price_within_market(&action, &quote));
        action.price = dec!(1.11);
        assert!(!price_within_market(&action, &quote));
    }

    #[test]
    fn sell_must_not_undercut_bid() {
        let quote = Quote::new(dec!(1.00), dec!(1.10));
        let mut action = TradeAction::parse("s c 1.00").unwrap();
        assert!(price_within_market(&action, &quote));
        action.price = dec!(0.99);
        assert!(!price_within_market(&action, &quote));
    }
}
