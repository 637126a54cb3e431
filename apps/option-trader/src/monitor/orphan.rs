//! Adoption of pre-existing open orders at startup.
//!
//! A crash or restart can leave live orders at the broker with no
//! local record. On startup the session lists them and lets the user
//! hand each one back to the monitor, reconstructing the tracked state
//! from the broker snapshot and the current position.

use crate::domain::{classify_intent, OptionSymbol, TrackedOrder};
use crate::error::ClientError;
use crate::gateway::{signed_position, OrderGateway, OrderSnapshot};

/// Open orders at the broker that this process did not place.
pub struct OrphanScan<'a> {
    gateway: &'a dyn OrderGateway,
}

impl<'a> OrphanScan<'a> {
    /// Create a scanner over the given gateway.
    #[must_use]
    pub const fn new(gateway: &'a dyn OrderGateway) -> Self {
        Self { gateway }
    }

    /// List open option orders on `underlying`, oldest-listed first.
    ///
    /// Orders whose symbols do not decode as OCC option symbols (stock
    /// orders, other asset classes) are skipped, as are options on
    /// other underlyings.
    pub async fn find(&self, underlying: &str) -> Result<Vec<OrderSnapshot>, ClientError> {
        let wanted = underlying.trim().to_ascii_uppercase();
        let open = self.gateway.open_orders().await?;
        Ok(open
            .into_iter()
            .filter(|snapshot| {
                OptionSymbol::decode(&snapshot.symbol)
                    .is_ok_and(|parsed| parsed.underlying == wanted)
            })
            .collect())
    }

    /// Reconstruct tracked state for one orphan so the monitor can
    /// take it over.
    ///
    /// The intent is re-derived from the current signed position, the
    /// same way it would have been at placement time. Orders without a
    /// limit price cannot be adjusted and are rejected.
    pub async fn adopt(&self, snapshot: &OrderSnapshot) -> Result<TrackedOrder, ClientError> {
        let limit_price = snapshot.limit_price.ok_or_else(|| {
            ClientError::Validation(format!(
                "order {} has no limit price and cannot be monitored",
                snapshot.id
            ))
        })?;

        let position = signed_position(self.gateway, &snapshot.symbol).await?;
        let intent = classify_intent(snapshot.side, position);

        tracing::info!(
            order_id = %snapshot.id,
            symbol = %snapshot.symbol,
            ?intent,
            "Adopted existing open order"
        );

        Ok(TrackedOrder::new(
            snapshot.id.clone(),
            snapshot.symbol.clone(),
            snapshot.qty,
            snapshot.side,
            limit_price,
            intent,
        ))
    }
}
