//! Closing-leg placement after an opening fill.

use crate::domain::{PositionIntent, TrackedOrder};
use crate::error::ClientError;
use crate::gateway::{OrderGateway, PlaceOrderRequest, QuoteSource};
use crate::monitor::Prompter;

/// Offers to place the closing leg of a round trip once an opening
/// order fills.
pub struct RoundTripCoordinator<'a> {
    gateway: &'a dyn OrderGateway,
    quotes: &'a dyn QuoteSource,
}

impl<'a> RoundTripCoordinator<'a> {
    /// Create a coordinator over the given collaborators.
    #[must_use]
    pub const fn new(gateway: &'a dyn OrderGateway, quotes: &'a dyn QuoteSource) -> Self {
        Self { gateway, quotes }
    }

    /// Offer a closing order for `filled`, a just-filled opening order.
    ///
    /// Closing-intent fills complete a round trip and get no follow-up.
    /// Declining the price prompt skips the closing leg; the position
    /// stays open. Returns the tracked closing order for a fresh
    /// monitoring session when one is placed.
    pub async fn offer_closing_order(
        &self,
        filled: &TrackedOrder,
        prompter: &mut dyn Prompter,
    ) -> Result<Option<TrackedOrder>, ClientError> {
        if filled.intent == PositionIntent::Close {
            prompter.notice("Position closed. Round trip complete.");
            return Ok(None);
        }

        prompter.notice(&format!(
            "Opening order filled: {} {} x{} @ {}",
            filled.side.as_str(),
            filled.symbol,
            filled.qty,
            filled.limit_price,
        ));
        match self.quotes.get_quote(&filled.symbol) {
            Some(quote) => prompter.notice(&format!("{}: {quote}", filled.symbol)),
            None => prompter.notice(&format!("{}: no live quote available.", filled.symbol)),
        }

        let limit_price = match prompter
            .prompt_price("Enter closing limit price (blank to skip): ")
            .await?
        {
            Some(price) => price,
            None => {
                prompter.notice("No closing order placed; position remains open.");
                return Ok(None);
            }
        };

        let request = PlaceOrderRequest {
            symbol: filled.symbol.clone(),
            qty: filled.qty,
            side: filled.side.inverted(),
            limit_price,
        };
        let snapshot = self.gateway.place_order(&request).await?;
        prompter.notice(&format!("Closing order placed: {}", snapshot.id));

        Ok(Some(TrackedOrder::new(
            snapshot.id,
            filled.symbol.clone(),
            filled.qty,
            request.side,
            limit_price,
            PositionIntent::Close,
        )))
    }
}
