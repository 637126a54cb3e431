//! Order monitoring state machine.
//!
//! A single cooperative loop drives one tracked order: each tick first
//! services any pending keyboard command to completion, then polls the
//! broker for status and renders a combined status line with live
//! call/put quotes at the tracked strike. Failed network calls are
//! reported and retried next tick; only a broker-confirmed terminal
//! status (or a user abort) ends the session.

pub mod input;
pub mod orphan;
pub mod roundtrip;
pub mod terminal;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::domain::{OptionRight, OptionSymbol, OrderOutcome, TrackedOrder};
use crate::error::ClientError;
use crate::gateway::{OrderGateway, PlaceOrderRequest, QuoteSource};

pub use input::{CommandInput, KeyboardInput, MonitorCommand, Prompter, RawModeGuard};

/// Timing knobs for the monitor loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sleep between status polls.
    pub poll_interval: Duration,
    /// Bounded wait for a pending keyboard command each tick.
    pub command_poll_timeout: Duration,
    /// Sleep between polls while waiting for a cancel to confirm.
    pub cancel_wait_interval: Duration,
    /// Polls to wait for cancel confirmation before giving up.
    pub max_cancel_polls: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            command_poll_timeout: Duration::from_millis(100),
            cancel_wait_interval: Duration::from_secs(1),
            max_cancel_polls: 30,
        }
    }
}

/// Monitors one order until it reaches a terminal status.
pub struct OrderMonitor<'a> {
    gateway: &'a dyn OrderGateway,
    quotes: &'a dyn QuoteSource,
    config: MonitorConfig,
    shutdown: CancellationToken,
}

impl<'a> OrderMonitor<'a> {
    /// Create a monitor over the given collaborators.
    #[must_use]
    pub fn new(
        gateway: &'a dyn OrderGateway,
        quotes: &'a dyn QuoteSource,
        config: MonitorConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            quotes,
            config,
            shutdown,
        }
    }

    /// Run the monitoring loop for `order` until a terminal outcome.
    ///
    /// `order` is mutated in place: adjustments update its limit price
    /// and may reassign its broker order id.
    pub async fn run(
        &self,
        order: &mut TrackedOrder,
        commands: &mut dyn CommandInput,
        prompter: &mut dyn Prompter,
    ) -> Result<OrderOutcome, ClientError> {
        prompter.notice("Monitoring order... Press 'A' to adjust, 'Q' to cancel.");

        loop {
            if self.shutdown.is_cancelled() {
                return Err(ClientError::Interrupted);
            }

            // A pending command is always serviced before the next
            // status query, so the display is never stale after one.
            let command = match commands.next_command(self.config.command_poll_timeout).await {
                Ok(command) => command,
                Err(e) => {
                    tracing::warn!(error = %e, "Command poll failed");
                    prompter.status_line(&format!("Command poll failed: {e}"));
                    None
                }
            };
            match command {
                Some(MonitorCommand::Cancel) => {
                    if let Some(outcome) = self.handle_cancel(order, prompter).await {
                        return Ok(outcome);
                    }
                    continue;
                }
                Some(MonitorCommand::Adjust) => {
                    self.handle_adjust(order, prompter).await;
                    continue;
                }
                None => {}
            }

            match self.gateway.get_order(&order.order_id).await {
                Ok(snapshot) => {
                    if let Some(outcome) = OrderOutcome::from_status(snapshot.status) {
                        prompter.notice(&format!("Order is done. Status: {}", snapshot.status));
                        return Ok(outcome);
                    }
                    prompter.status_line(&self.render_status(order, snapshot.status.as_str()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, order_id = %order.order_id, "Status query failed");
                    prompter.status_line(&format!("Status query failed: {e}"));
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.config.poll_interval) => {}
                () = self.shutdown.cancelled() => return Err(ClientError::Interrupted),
            }
        }
    }

    /// Service a `Q` command. Returns the terminal outcome if the order
    /// was canceled; `None` returns the loop to monitoring.
    async fn handle_cancel(
        &self,
        order: &TrackedOrder,
        prompter: &mut dyn Prompter,
    ) -> Option<OrderOutcome> {
        match prompter
            .confirm("Are you sure you want to cancel this order?")
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                prompter.notice("Cancellation aborted.");
                return None;
            }
            Err(e) => {
                prompter.notice(&format!("Prompt failed: {e}"));
                return None;
            }
        }

        match self.gateway.cancel_order(&order.order_id).await {
            Ok(()) => {
                prompter.notice("Order cancelled successfully.");
                Some(OrderOutcome::Canceled)
            }
            Err(e) => {
                prompter.notice(&format!("Failed to cancel order: {e}"));
                None
            }
        }
    }

    /// Service an `A` command: re-fetch status, classify, and either
    /// replace in place or cancel-and-replace. Never fatal; every
    /// failure path returns to monitoring with the order unchanged
    /// except as explicitly recorded.
    async fn handle_adjust(&self, order: &mut TrackedOrder, prompter: &mut dyn Prompter) {
        let snapshot = match self.gateway.get_order(&order.order_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                prompter.notice(&format!("Could not fetch order status: {e}"));
                return;
            }
        };

        match self.quotes.get_quote(&order.symbol) {
            Some(quote) => prompter.notice(&format!("{}: {quote}", order.symbol)),
            None => prompter.notice(&format!("{}: no live quote available.", order.symbol)),
        }

        let new_price = match prompter
            .prompt_price("Enter new limit price (blank to abort): ")
            .await
        {
            Ok(Some(price)) => price,
            Ok(None) => {
                prompter.notice("Adjustment aborted.");
                return;
            }
            Err(e) => {
                prompter.notice(&format!("Prompt failed: {e}"));
                return;
            }
        };

        if snapshot.status.is_replaceable_in_place() {
            self.replace_in_place(order, new_price, prompter).await;
        } else {
            self.cancel_and_replace(order, new_price, prompter).await;
        }
    }

    async fn replace_in_place(
        &self,
        order: &mut TrackedOrder,
        new_price: rust_decimal::Decimal,
        prompter: &mut dyn Prompter,
    ) {
        match self.gateway.replace_order(&order.order_id, new_price).await {
            Ok(snapshot) => {
                // The broker may mint a new id even for an in-place replace.
                order.record_adjustment(snapshot.id, new_price);
                prompter.notice("Order replaced successfully.");
            }
            Err(e) => prompter.notice(&format!("Failed to replace order: {e}")),
        }
    }

    /// Cancel the order, block until the broker confirms the
    /// cancellation, then place a fresh order at the new price. No
    /// other input is serviced during the wait, deliberately: a replace
    /// must never race an in-flight cancel.
    async fn cancel_and_replace(
        &self,
        order: &mut TrackedOrder,
        new_price: rust_decimal::Decimal,
        prompter: &mut dyn Prompter,
    ) {
        if let Err(e) = self.gateway.cancel_order(&order.order_id).await {
            prompter.notice(&format!("Failed to cancel order for replacement: {e}"));
            return;
        }

        let mut confirmed = false;
        for attempt in 0..self.config.max_cancel_polls {
            match self.gateway.get_order(&order.order_id).await {
                Ok(snapshot) if snapshot.status.is_terminal() => {
                    if let Some(OrderOutcome::Filled) = OrderOutcome::from_status(snapshot.status) {
                        prompter.notice("Order filled before it could be cancelled.");
                        return;
                    }
                    confirmed = true;
                    break;
                }
                Ok(snapshot) => {
                    prompter.status_line(&format!(
                        "Waiting for cancellation... ({})",
                        snapshot.status
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "Cancel confirmation poll failed");
                }
            }
            tokio::time::sleep(self.config.cancel_wait_interval).await;
        }

        if !confirmed {
            let err = ClientError::StateConflict(format!(
                "cancellation of order {} was never confirmed",
                order.order_id
            ));
            prompter.notice(&format!("Adjustment abandoned: {err}"));
            return;
        }

        let request = PlaceOrderRequest {
            symbol: order.symbol.clone(),
            qty: order.qty,
            side: order.side,
            limit_price: new_price,
        };
        match self.gateway.place_order(&request).await {
            Ok(snapshot) => {
                order.record_adjustment(snapshot.id, new_price);
                prompter.notice("Order re-placed at new price.");
            }
            Err(e) => {
                prompter.notice(&format!(
                    "Original order cancelled but the replacement failed: {e}"
                ));
            }
        }
    }

    /// One combined status line: broker status plus live call and put
    /// quotes at the tracked strike, when the symbol parses.
    fn render_status(&self, order: &TrackedOrder, status: &str) -> String {
        let mut line = format!("Order status: {}", status.to_uppercase());

        if let Ok(parsed) = OptionSymbol::decode(&order.symbol) {
            for right in [OptionRight::Call, OptionRight::Put] {
                let leg = OptionSymbol {
                    right,
                    ..parsed.clone()
                };
                if let Ok(symbol) = leg.encode() {
                    match self.quotes.get_quote(&symbol) {
                        Some(quote) => {
                            line.push_str(&format!(" | {} {quote}", right.occ_code()));
                        }
                        None => line.push_str(&format!(" | {} -/-", right.occ_code())),
                    }
                }
            }
        }

        line
    }
}
